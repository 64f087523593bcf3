//! ABRASF XML document model.
//!
//! Documents are immutable element trees built in one pass by
//! [`abrasf::serialize`] and rendered to bytes by [`XmlWriter`].

pub mod abrasf;
mod writer;

pub use abrasf::{build_comp_nfse, serialize, serialize_batch, NFSE_NAMESPACE};
pub use writer::{WriteOptions, XmlWriter};

use crate::error::DocumentError;

/// Root element of every document.
pub const ROOT_TAG: &str = "ListaNfse";

/// Element wrapping one invoice.
pub const INVOICE_TAG: &str = "CompNfse";

/// Content of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlBody {
    Empty,
    Text(String),
    Children(Vec<XmlElement>),
}

/// One XML element with ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    body: XmlBody,
}

impl XmlElement {
    /// Element with no content.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            body: XmlBody::Empty,
        }
    }

    /// Leaf element holding text.
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            body: XmlBody::Text(text.into()),
        }
    }

    /// Element holding children in the given order.
    pub fn parent(name: impl Into<String>, children: Vec<XmlElement>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            body: XmlBody::Children(children),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &XmlBody {
        &self.body
    }

    /// Text content of a leaf element.
    pub fn text_content(&self) -> Option<&str> {
        match &self.body {
            XmlBody::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn children(&self) -> &[XmlElement] {
        match &self.body {
            XmlBody::Children(children) => children,
            _ => &[],
        }
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children().iter().find(|c| c.name == name)
    }

    /// Follow a path of child names, e.g. `["Servico", "Valores"]`.
    pub fn find_path(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter()
            .try_fold(self, |element, name| element.child(name))
    }

    /// Names of the direct children, in order.
    pub fn child_names(&self) -> Vec<&str> {
        self.children().iter().map(|c| c.name()).collect()
    }
}

/// A complete `ListaNfse` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    /// Wrap invoice subtrees in a `ListaNfse` root carrying the ABRASF
    /// default namespace.
    pub fn from_invoices(invoices: Vec<XmlElement>) -> Self {
        Self {
            root: XmlElement::parent(ROOT_TAG, invoices).with_attribute("xmlns", NFSE_NAMESPACE),
        }
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// The invoice subtree of a single-invoice document.
    pub fn comp_nfse(&self) -> Result<&XmlElement, DocumentError> {
        self.root
            .child(INVOICE_TAG)
            .ok_or_else(|| DocumentError::MissingElement(INVOICE_TAG.to_string()))
    }

    /// Every invoice subtree, in document order.
    pub fn invoices(&self) -> impl Iterator<Item = &XmlElement> {
        self.root
            .children()
            .iter()
            .filter(|c| c.name() == INVOICE_TAG)
    }

    /// Flatten several documents into one `ListaNfse`, keeping input order.
    ///
    /// Fails if any document lacks its `CompNfse` subtree.
    pub fn consolidate<'a, I>(documents: I) -> Result<Self, DocumentError>
    where
        I: IntoIterator<Item = &'a XmlDocument>,
    {
        let mut invoices = Vec::new();
        for document in documents {
            document.comp_nfse()?;
            invoices.extend(document.invoices().cloned());
        }
        Ok(Self::from_invoices(invoices))
    }
}
