//! Declarative rule sets that reshape a document tree.
//!
//! A rule set is markup:
//!
//! ```xml
//! <rules>
//!   <select match="orders/order" root="NewDataSet"/>
//!   <rename match="qty" to="Quantity"/>
//!   <drop match="internal"/>
//!   <unwrap match="details"/>
//!   <lift-attributes match="order"/>
//! </rules>
//! ```
//!
//! Rules run in order, each as a full pass over the tree. Empty text,
//! `<rules/>`, and the classic identity stylesheet are all the identity
//! transform.

use std::str::FromStr;

use crate::error::TransformError;
use crate::markup::parse_markup;
use crate::tree::{Document, Element, Node};

/// Root used by `select` when none is given.
pub const DEFAULT_SELECT_ROOT: &str = "NewDataSet";

/// An element pattern: a name, `*`, or a `/`-separated path.
///
/// Paths match the trailing ancestry of an element; a leading `/` anchors
/// the path at the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    steps: Vec<String>,
    anchored: bool,
}

impl Pattern {
    pub fn parse(text: &str) -> Result<Self, TransformError> {
        let trimmed = text.trim();
        let anchored = trimmed.starts_with('/');
        let steps: Vec<String> = trimmed
            .split('/')
            .map(str::trim)
            .filter(|step| !step.is_empty())
            .map(str::to_string)
            .collect();
        if steps.is_empty() {
            return Err(TransformError::failure(format!(
                "invalid match pattern '{trimmed}'"
            )));
        }
        Ok(Self { steps, anchored })
    }

    /// Tests the pattern against a root-to-element path of names.
    pub fn matches(&self, path: &[String]) -> bool {
        if path.len() < self.steps.len() || (self.anchored && path.len() != self.steps.len()) {
            return false;
        }
        let tail = &path[path.len() - self.steps.len()..];
        self.steps
            .iter()
            .zip(tail)
            .all(|(step, name)| step == "*" || step == name)
    }
}

/// One rewriting rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Re-roots the document on every outermost matching element.
    Select { pattern: Pattern, root: String },
    Rename { pattern: Pattern, to: String },
    Drop { pattern: Pattern },
    /// Replaces matching elements with their children.
    Unwrap { pattern: Pattern },
    /// Turns attributes into leading child elements.
    LiftAttributes { pattern: Pattern },
}

impl Rule {
    fn pattern(&self) -> &Pattern {
        match self {
            Self::Select { pattern, .. }
            | Self::Rename { pattern, .. }
            | Self::Drop { pattern }
            | Self::Unwrap { pattern }
            | Self::LiftAttributes { pattern } => pattern,
        }
    }

    fn from_element(element: &Element) -> Result<Self, TransformError> {
        let pattern = Pattern::parse(required(element, "match")?)?;
        match element.name.as_str() {
            "select" => Ok(Self::Select {
                pattern,
                root: element
                    .attribute("root")
                    .map_or(DEFAULT_SELECT_ROOT, str::trim)
                    .to_string(),
            }),
            "rename" => Ok(Self::Rename {
                pattern,
                to: required(element, "to")?.trim().to_string(),
            }),
            "drop" => Ok(Self::Drop { pattern }),
            "unwrap" => Ok(Self::Unwrap { pattern }),
            "lift-attributes" => Ok(Self::LiftAttributes { pattern }),
            other => Err(TransformError::failure(format!(
                "unknown rule element '{other}'"
            ))),
        }
    }
}

fn required<'a>(element: &'a Element, attribute: &str) -> Result<&'a str, TransformError> {
    element
        .attribute(attribute)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            TransformError::failure(format!(
                "rule '{}' requires attribute '{attribute}'",
                element.name
            ))
        })
}

/// An ordered list of rules; empty means identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Parses rule-set markup.
    pub fn parse(text: &str) -> Result<Self, TransformError> {
        if text.trim().is_empty() {
            return Ok(Self::identity());
        }
        let document = parse_markup(text).map_err(TransformError::failure)?;
        let root = &document.root;

        if root.name == "rules" {
            let rules = root
                .elements()
                .map(Rule::from_element)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self { rules });
        }

        if matches!(local_name(&root.name), "stylesheet" | "transform") {
            return if is_identity_stylesheet(root) {
                Ok(Self::identity())
            } else {
                Err(TransformError::failure(
                    "only the identity stylesheet is supported; write other transforms as \
                     <rules> using <select match=.. root=..>, <rename match=.. to=..>, \
                     <drop match=..>, <unwrap match=..> or <lift-attributes match=..>",
                ))
            };
        }

        Err(TransformError::failure(format!(
            "unsupported rule set root element '{}'",
            root.name
        )))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_identity(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies every rule in order.
    pub fn apply(&self, document: Document) -> Document {
        let result = self
            .rules
            .iter()
            .fold(document, |document, rule| apply_rule(rule, document));
        tracing::debug!(rules = self.rules.len(), root = %result.root.name, "applied rule set");
        result
    }
}

impl FromStr for RuleSet {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn is_copy_all(select: Option<&str>) -> bool {
    let Some(select) = select else {
        return true;
    };
    let compact: String = select.chars().filter(|c| !c.is_whitespace()).collect();
    matches!(compact.as_str(), "node()|@*" | "@*|node()")
}

/// Recognizes `<xsl:template match="node()|@*"><xsl:copy><xsl:apply-templates/>`.
fn is_identity_stylesheet(root: &Element) -> bool {
    let mut has_template = false;
    for child in root.elements() {
        match local_name(&child.name) {
            "output" | "strip-space" => {}
            "template" => {
                has_template = true;
                if !is_copy_all(Some(child.attribute("match").unwrap_or_default())) {
                    return false;
                }
                let copies: Vec<&Element> = child.elements().collect();
                let [copy] = copies.as_slice() else {
                    return false;
                };
                if local_name(&copy.name) != "copy" {
                    return false;
                }
                let applies_all = copy.elements().all(|apply| {
                    local_name(&apply.name) == "apply-templates"
                        && is_copy_all(apply.attribute("select"))
                });
                if !applies_all || !copy.has_elements() {
                    return false;
                }
            }
            _ => return false,
        }
    }
    has_template
}

fn apply_rule(rule: &Rule, mut document: Document) -> Document {
    let mut path = Vec::new();
    match rule {
        Rule::Select { pattern, root } => {
            let mut selected = Vec::new();
            collect_matches(&document.root, pattern, &mut path, &mut selected);
            let mut new_root = Element::new(root.clone());
            new_root.children = selected.into_iter().map(Node::Element).collect();
            Document::new(new_root)
        }
        _ => {
            rewrite(&mut document.root, rule, &mut path);
            document
        }
    }
}

fn collect_matches(
    element: &Element,
    pattern: &Pattern,
    path: &mut Vec<String>,
    selected: &mut Vec<Element>,
) {
    path.push(element.name.clone());
    if pattern.matches(path) {
        selected.push(element.clone());
    } else {
        for child in element.elements() {
            collect_matches(child, pattern, path, selected);
        }
    }
    path.pop();
}

/// Rewrites `element` and its descendants; the root itself is never
/// dropped or unwrapped.
fn rewrite(element: &mut Element, rule: &Rule, path: &mut Vec<String>) {
    path.push(element.name.clone());
    if rule.pattern().matches(path) {
        match rule {
            Rule::Rename { to, .. } => element.name.clone_from(to),
            Rule::LiftAttributes { .. } => lift_attributes(element),
            _ => {}
        }
    }

    let children = std::mem::take(&mut element.children);
    for child in children {
        let Node::Element(mut child) = child else {
            element.children.push(child);
            continue;
        };
        path.push(child.name.clone());
        let child_matches = rule.pattern().matches(path);
        path.pop();

        match rule {
            Rule::Drop { .. } if child_matches => {}
            Rule::Unwrap { .. } if child_matches => {
                rewrite(&mut child, rule, path);
                element.children.append(&mut child.children);
            }
            _ => {
                rewrite(&mut child, rule, path);
                element.children.push(Node::Element(child));
            }
        }
    }
    path.pop();
}

fn lift_attributes(element: &mut Element) {
    let lifted: Vec<Node> = element
        .attributes
        .drain(..)
        .map(|(name, value)| Node::Element(Element::new(name).with_child(Node::Text(value))))
        .collect();
    element.children.splice(0..0, lifted);
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY_XSLT: &str = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
    <xsl:template match="node()|@*">
      <xsl:copy>
        <xsl:apply-templates select="node()|@*"/>
      </xsl:copy>
    </xsl:template>
</xsl:stylesheet>"#;

    fn path(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn test_pattern_matching() {
        let name = Pattern::parse("qty").unwrap();
        assert!(name.matches(&path(&["orders", "order", "qty"])));
        assert!(!name.matches(&path(&["orders", "order"])));

        let nested = Pattern::parse("order/qty").unwrap();
        assert!(nested.matches(&path(&["orders", "order", "qty"])));
        assert!(!nested.matches(&path(&["orders", "line", "qty"])));

        let anchored = Pattern::parse("/orders/*").unwrap();
        assert!(anchored.matches(&path(&["orders", "order"])));
        assert!(!anchored.matches(&path(&["root", "orders", "order"])));

        assert!(Pattern::parse(" / ").is_err());
    }

    #[test]
    fn test_identity_forms() {
        assert!(RuleSet::parse("").unwrap().is_identity());
        assert!(RuleSet::parse("<rules/>").unwrap().is_identity());
        assert!(RuleSet::parse(IDENTITY_XSLT).unwrap().is_identity());
    }

    #[test]
    fn test_other_stylesheets_fail() {
        let xslt = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
            <xsl:template match="/"><out/></xsl:template>
        </xsl:stylesheet>"#;
        let err = RuleSet::parse(xslt).unwrap_err();
        assert!(matches!(err, TransformError::Failure { .. }));
        for element in ["<rules>", "<select", "<rename", "<drop", "<unwrap", "<lift-attributes"] {
            assert!(err.message().contains(element), "{element} missing from {err}");
        }
    }

    #[test]
    fn test_invalid_rule_sets() {
        assert!(RuleSet::parse("<rules><explode match=\"a\"/></rules>").is_err());
        assert!(RuleSet::parse("<rules><rename match=\"a\"/></rules>").is_err());
        assert!(RuleSet::parse("<rules><drop/></rules>").is_err());
        assert!(RuleSet::parse("<rules>").is_err());
        assert!(RuleSet::parse("<html/>").is_err());
    }

    fn orders() -> Document {
        parse_markup(
            r#"<feed>
                 <orders>
                   <order id="1"><qty>3</qty><internal>x</internal><details><sku>A</sku></details></order>
                   <order id="2"><qty>5</qty></order>
                 </orders>
               </feed>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_select_rename_drop_unwrap_lift() {
        let rules = RuleSet::parse(
            r#"<rules>
                 <select match="orders/order"/>
                 <rename match="qty" to="Quantity"/>
                 <drop match="internal"/>
                 <unwrap match="details"/>
                 <lift-attributes match="order"/>
               </rules>"#,
        )
        .unwrap();
        assert_eq!(rules.rules().len(), 5);

        let result = rules.apply(orders());
        let expected = parse_markup(
            "<NewDataSet>\
               <order><id>1</id><Quantity>3</Quantity><sku>A</sku></order>\
               <order><id>2</id><Quantity>5</Quantity></order>\
             </NewDataSet>",
        )
        .unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_select_outermost_match_wins() {
        let rules = RuleSet::parse(r#"<rules><select match="*" root="all"/></rules>"#).unwrap();
        let result = rules.apply(orders());
        assert_eq!(result.root.name, "all");
        assert_eq!(result.root.elements().count(), 1);
        assert_eq!(result.root.elements().next().unwrap().name, "feed");
    }

    #[test]
    fn test_identity_leaves_document_unchanged() {
        assert_eq!(RuleSet::identity().apply(orders()), orders());
    }
}
