use std::rc::Rc;

pub type ViewId = u64;

pub type Callback = Rc<dyn Fn()>;

#[derive(Clone)]
pub enum ViewKind {
    Box,
    Row,
    Column,
    Text {
        text: String,
    },
    Button {
        text: String,
        on_click: Option<Callback>,
    },
    /// Placeholder left by a component whose data is not ready yet.
    Suspended,
}

impl std::fmt::Debug for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKind::Box => write!(f, "Box"),
            ViewKind::Row => write!(f, "Row"),
            ViewKind::Column => write!(f, "Column"),
            ViewKind::Suspended => write!(f, "Suspended"),
            ViewKind::Text { text } => f.debug_struct("Text").field("text", text).finish(),
            ViewKind::Button { text, .. } => f
                .debug_struct("Button")
                .field("text", text)
                .field("on_click", &"<callback>")
                .finish(),
        }
    }
}

/// Structural equality. Callbacks compare by presence only.
impl PartialEq for ViewKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ViewKind::Box, ViewKind::Box)
            | (ViewKind::Row, ViewKind::Row)
            | (ViewKind::Column, ViewKind::Column)
            | (ViewKind::Suspended, ViewKind::Suspended) => true,
            (ViewKind::Text { text: a }, ViewKind::Text { text: b }) => a == b,
            (
                ViewKind::Button {
                    text: a,
                    on_click: ca,
                },
                ViewKind::Button {
                    text: b,
                    on_click: cb,
                },
            ) => a == b && ca.is_some() == cb.is_some(),
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct View {
    pub id: ViewId,
    pub kind: ViewKind,
    pub children: Vec<View>,
}

impl View {
    pub fn new(id: ViewId, kind: ViewKind) -> Self {
        View {
            id,
            kind,
            children: vec![],
        }
    }
    pub fn with_children(mut self, kids: Vec<View>) -> Self {
        self.children = kids;
        self
    }

    /// Depth-first walk over this view and its descendants.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a View)) {
        f(self);
        for c in &self.children {
            c.walk(f);
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.walk(&mut |v| {
            if let ViewKind::Text { text } = &v.kind {
                out.push(text.as_str());
            }
        });
        out
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    pub fn is_suspended(&self) -> bool {
        let mut found = false;
        self.walk(&mut |v| found |= matches!(v.kind, ViewKind::Suspended));
        found
    }

    pub fn find_button(&self, label: &str) -> Option<&View> {
        let mut found = None;
        self.walk(&mut |v| {
            if found.is_none()
                && let ViewKind::Button { text, .. } = &v.kind
                && text == label
            {
                found = Some(v);
            }
        });
        found
    }

    /// Invokes the click handler of the first button labelled `label`.
    /// Returns false if there is no such button.
    pub fn click(&self, label: &str) -> bool {
        match self.find_button(label).map(|v| &v.kind) {
            Some(ViewKind::Button {
                on_click: Some(cb), ..
            }) => {
                cb();
                true
            }
            _ => false,
        }
    }
}
