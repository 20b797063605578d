use std::fmt::Write;

use indexmap::IndexMap;

pub const XML_PROLOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum XmlNode {
    Element(XmlElement),
    /// Text, escaped when rendered.
    Text(String),
    /// Text emitted verbatim inside a CDATA section.
    CData(String),
}

impl From<XmlElement> for XmlNode {
    fn from(element: XmlElement) -> Self {
        Self::Element(element)
    }
}

impl From<String> for XmlNode {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for XmlNode {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct XmlElement {
    pub tag_name: String,
    pub children: Vec<XmlNode>,
    pub attrs: IndexMap<String, String>,
}

impl XmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag_name: tag.into(),
            children: Vec::new(),
            attrs: IndexMap::new(),
        }
    }

    pub fn attr<V>(mut self, name: impl Into<String>, value: impl Into<Option<V>>) -> Self
    where
        V: Into<String>,
    {
        let name = name.into();
        match value.into() {
            Some(value) => {
                *self.attrs.entry(name).or_default() = value.into();
            }
            None => {
                self.attrs.shift_remove(&name);
            }
        }

        self
    }

    pub fn child(mut self, child: impl Into<XmlNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<N>(mut self, children: impl IntoIterator<Item = N>) -> Self
    where
        N: Into<XmlNode>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Appends `text` as a CDATA section.
    pub fn cdata(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::CData(text.into()));
        self
    }
}

/// Returns an element named `tag` holding `text`, or `None` when there is no
/// text. Handy for optional fields.
pub fn text_element(tag: &str, text: Option<impl Into<String>>) -> Option<XmlElement> {
    text.map(|text| XmlElement::new(tag).child(XmlNode::Text(text.into())))
}

pub fn escape_xml(content: &str) -> String {
    content
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Wraps `text` in a CDATA section. A `]]>` inside the text is split across
/// two sections so the text survives intact.
pub fn wrap_cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

pub trait Visitor {
    type Error;

    fn visit(&mut self, element: &XmlElement) -> Result<(), Self::Error>;

    fn visit_children(&mut self, children: &[XmlNode]) -> Result<(), Self::Error> {
        for child in children {
            match child {
                XmlNode::Element(element) => self.visit(element)?,
                XmlNode::Text(text) => self.visit_text(text)?,
                XmlNode::CData(text) => self.visit_cdata(text)?,
            }
        }

        Ok(())
    }

    fn visit_text(&mut self, text: &str) -> Result<(), Self::Error>;

    fn visit_cdata(&mut self, text: &str) -> Result<(), Self::Error>;

    fn visit_attr(&mut self, name: &str, value: &str) -> Result<(), Self::Error>;
}

/// A renderer for [`XmlElement`]s to a string of XML.
pub struct XmlRenderer {
    xml: String,
}

impl XmlRenderer {
    /// Returns a new [`XmlRenderer`].
    pub fn new() -> Self {
        Self { xml: String::new() }
    }

    /// Renders the given [`XmlElement`] to a string of XML.
    pub fn render_to_string(mut self, element: &XmlElement) -> Result<String, std::fmt::Error> {
        self.visit(element)?;

        Ok(self.xml)
    }

    /// Renders `root` as a complete document, prolog included.
    pub fn render_document(self, root: &XmlElement) -> Result<String, std::fmt::Error> {
        let rendered = self.render_to_string(root)?;

        Ok(format!("{XML_PROLOG}\n{rendered}"))
    }
}

/// Renders `root` as a complete XML document.
pub fn render_document(root: &XmlElement) -> Result<String, std::fmt::Error> {
    XmlRenderer::new().render_document(root)
}

impl Default for XmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for XmlRenderer {
    type Error = std::fmt::Error;

    fn visit(&mut self, element: &XmlElement) -> Result<(), Self::Error> {
        write!(&mut self.xml, "<{}", element.tag_name)?;

        for (name, value) in &element.attrs {
            self.visit_attr(name, value)?;
        }

        if element.children.is_empty() {
            write!(&mut self.xml, "/>")?;
            return Ok(());
        }

        write!(&mut self.xml, ">")?;

        self.visit_children(&element.children)?;

        write!(&mut self.xml, "</{}>", element.tag_name)?;

        Ok(())
    }

    fn visit_text(&mut self, text: &str) -> Result<(), Self::Error> {
        write!(&mut self.xml, "{}", escape_xml(text))
    }

    fn visit_cdata(&mut self, text: &str) -> Result<(), Self::Error> {
        write!(&mut self.xml, "{}", wrap_cdata(text))
    }

    fn visit_attr(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        write!(&mut self.xml, r#" {name}="{}""#, escape_xml(value))
    }
}
