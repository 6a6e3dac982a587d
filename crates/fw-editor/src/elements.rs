//! Detectable plain elements (`div`, `section`, `span`).
//!
//! Most screenshot parts are wrapped in one of these rather than a bespoke
//! component, e.g. the message input box is a detectable `div` with
//! `ConversationInput` metadata.

use crate::detect::{Component, Detectable, HostProps, detectable};
use crate::input::{Handlers, PointerEvent};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Div,
    Section,
    Span,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Div => "div",
            Self::Section => "section",
            Self::Span => "span",
        }
    }
}

/// Forwarded props of a plain element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementProps {
    pub class: Option<String>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl ElementProps {
    pub fn class(class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            ..Self::default()
        }
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Host-neutral description of a rendered element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    pub attributes: SmallVec<[(String, String); 2]>,
    pub class: Option<String>,
    pub text: Option<String>,
    pub handlers: Option<Handlers>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Find the path from `self` down to the element whose `id` attribute is
    /// `id`, returned innermost first (the order events bubble in).
    pub fn bubble_path(&self, id: &str) -> Option<Vec<&Element>> {
        if self.attribute("id") == Some(id) {
            return Some(vec![self]);
        }
        self.children.iter().find_map(|child| {
            let mut path = child.bubble_path(id)?;
            path.push(self);
            Some(path)
        })
    }

    /// Dispatch `event` at the element with `id` and bubble it outwards.
    /// Returns how many handlers ran; zero if `id` is not in this tree.
    pub fn dispatch(&self, id: &str, event: &mut PointerEvent) -> usize {
        match self.bubble_path(id) {
            Some(path) => {
                let handlers: Vec<Option<&Handlers>> =
                    path.iter().map(|el| el.handlers.as_ref()).collect();
                crate::input::dispatch(event, &handlers)
            }
            None => 0,
        }
    }
}

impl Component for Tag {
    type Props = ElementProps;
    type Output = Element;

    fn name(&self) -> &str {
        self.as_str()
    }

    fn render(&self, props: &ElementProps, host: HostProps) -> Element {
        let mut attributes = SmallVec::new();
        attributes.push(("id".to_string(), host.id.as_str().to_string()));
        let (name, value) = host.data_attribute();
        attributes.push((name.to_string(), value.to_string()));
        Element {
            tag: *self,
            attributes,
            class: props.class.clone(),
            text: props.text.clone(),
            handlers: host.handlers,
            children: props.children.clone(),
        }
    }
}

pub fn div() -> Detectable<Tag> {
    detectable(Tag::Div)
}

pub fn section() -> Detectable<Tag> {
    detectable(Tag::Section)
}

pub fn span() -> Detectable<Tag> {
    detectable(Tag::Span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::detect::DetectProps;
    use crate::drag::DragFlag;
    use crate::mode::ModeSwitch;
    use crate::session::EditorSession;
    use fw_core::{ElementHandle, MetaDataType, NodeMetadata};
    use std::rc::Rc;

    fn session() -> EditorSession {
        EditorSession::new(
            SessionConfig::default(),
            Rc::new(ModeSwitch::default()),
            Rc::new(DragFlag::new()),
        )
    }

    #[test]
    fn renders_identity_attributes() {
        let s = session();
        let div = div();
        assert_eq!(div.display_name(), "NodeDetected(div)");
        let mut node = div.mount(&s);
        let el = node
            .render(DetectProps::new(ElementProps::class("min-w-0 flex-1")))
            .fresh()
            .unwrap();
        assert_eq!(el.tag, Tag::Div);
        assert_eq!(el.attribute("id"), Some(node.id().as_str()));
        assert_eq!(el.attribute("nd-id"), Some(node.id().as_str()));
        assert_eq!(el.class.as_deref(), Some("min-w-0 flex-1"));
        assert!(el.handlers.is_some());
    }

    #[test]
    fn nested_click_activates_innermost() {
        let s = session();
        let mut outer = section().mount(&s);
        let mut inner = span().mount(&s);
        let inner_el = inner
            .render(
                DetectProps::new(ElementProps::default().with_text("hello"))
                    .metadata(NodeMetadata::new(MetaDataType::ChatItem)),
            )
            .fresh()
            .unwrap();
        let tree = outer
            .render(
                DetectProps::new(ElementProps::default().with_child(inner_el))
                    .metadata(NodeMetadata::new(MetaDataType::ChatList))
                    .allow_child_sort(true),
            )
            .fresh()
            .unwrap();
        outer.attach(ElementHandle(1));
        inner.attach(ElementHandle(2));
        s.flush();

        let ran = tree.dispatch(inner.id().as_str(), &mut PointerEvent::click());
        assert_eq!(ran, 1);
        assert_eq!(s.activated(), Some(inner.id()));

        assert_eq!(tree.dispatch("missing", &mut PointerEvent::click()), 0);
        assert!(s.registry().record(outer.id()).unwrap().allows_child_sort);
    }
}
