//! Document traversal.
//!
//! Turns a [`Node`] tree into the flat sequence of [`Event`]s the conversion
//! state machine consumes. Traversal follows docutils' `walkabout`: a visit
//! event before a node's children, a depart event after them, and a
//! [`Flow::StopTraversal`] that cuts the walk short while still delivering the
//! depart events of every node already entered.

use crate::doctree::Node;
use crate::error::Result;
use log::debug;

/// A node-visit or node-depart notification, stripped of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    EnterDocument,
    LeaveDocument,
    EnterSection,
    Comment(String),
    /// A `desc` node; `domain` is empty when the attribute is missing
    EnterDefinition { domain: String },
    LeaveDefinition,
    /// A `desc_signature` node
    Signature {
        method: Option<String>,
        path: Option<String>,
    },
    EnterBulletList,
    LeaveBulletList,
    Paragraph(String),
    FieldName(String),
    Term(String),
}

/// What the walker should do after a visit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    StopTraversal,
}

/// Receiver of traversal events.
pub trait NodeHandler {
    fn handle(&mut self, event: Event) -> Result<Flow>;
}

/// Event emitted when entering `node`, if its tag is one the conversion cares about
pub fn visit_event(node: &Node) -> Option<Event> {
    let event = match node.tagname.as_str() {
        "document" => Event::EnterDocument,
        "section" => Event::EnterSection,
        "comment" => Event::Comment(node.astext()),
        "desc" => Event::EnterDefinition {
            domain: node.attr("domain").unwrap_or_default().to_string(),
        },
        "desc_signature" => Event::Signature {
            method: node.attr("method").map(str::to_string),
            path: node.attr("path").map(str::to_string),
        },
        "bullet_list" => Event::EnterBulletList,
        "paragraph" => Event::Paragraph(node.astext()),
        "field_name" => Event::FieldName(node.astext()),
        "term" => Event::Term(node.astext()),
        _ => return None,
    };
    Some(event)
}

/// Event emitted when leaving `node`
pub fn depart_event(node: &Node) -> Option<Event> {
    match node.tagname.as_str() {
        "document" => Some(Event::LeaveDocument),
        "desc" => Some(Event::LeaveDefinition),
        "bullet_list" => Some(Event::LeaveBulletList),
        _ => None,
    }
}

/// Walks `node` depth-first, feeding `handler`.
///
/// Returns `true` when the traversal was stopped early.
pub fn walkabout<H: NodeHandler + ?Sized>(node: &Node, handler: &mut H) -> Result<bool> {
    let mut stop = false;

    let visit_flow = match visit_event(node) {
        Some(event) => handler.handle(event)?,
        None => Flow::Continue,
    };

    if visit_flow == Flow::StopTraversal {
        debug!("Traversal stopped at <{}>", node.tagname);
        stop = true;
    } else {
        for child in &node.children {
            if walkabout(child, handler)? {
                stop = true;
                break;
            }
        }
    }

    if let Some(event) = depart_event(node) {
        handler.handle(event)?;
    }

    Ok(stop)
}
