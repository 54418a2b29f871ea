//! Reaction scheme formatting
//!
//! Turns plain notation such as `CH3CH2OH + HBr -> CH3CH2Br + H2O` into
//! markup with subscripted counts.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").expect("digit pattern is valid"));

/// Subscripts digit runs and spaces out `+` signs
///
/// ```
/// use orgchem::reaction::format_chemicals;
///
/// assert_eq!(format_chemicals("H2O"), "H<sub>2</sub>O");
/// assert_eq!(format_chemicals("A+B"), "A + B");
/// ```
pub fn format_chemicals(chemicals: &str) -> String {
    DIGITS
        .replace_all(chemicals, "<sub>$1</sub>")
        .replace('+', " + ")
}

/// Renders `reactants -> products`
///
/// Returns `None` unless the notation has exactly one arrow.
pub fn render_reaction(reaction: &str, conditions: Option<&str>) -> Option<String> {
    let (reactants, products) = reaction.split_once("->")?;
    if products.contains("->") {
        return None;
    }

    let conditions = conditions
        .filter(|c| !c.is_empty())
        .map(|c| format!(r#"<div class="reaction-conditions">Conditions: {}</div>"#, c))
        .unwrap_or_default();

    Some(format!(
        r#"<div class="reaction-equation"><span class="reactants">{}</span><span class="reaction-arrow">→</span><span class="products">{}</span></div>{}"#,
        format_chemicals(reactants),
        format_chemicals(products),
        conditions
    ))
}

/// Structured reaction, as found in `data-reaction-json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionData {
    pub reactants: Vec<Reactant>,
    pub products: Vec<Product>,
    #[serde(default)]
    pub arrow: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reactant {
    pub formula: String,
    #[serde(default)]
    pub catalyst: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub formula: String,
    /// Percent yield
    #[serde(default, rename = "yield")]
    pub yield_percent: Option<f64>,
}

impl ReactionData {
    pub fn render(&self) -> String {
        let reactants = self
            .reactants
            .iter()
            .map(|r| {
                let catalyst = r
                    .catalyst
                    .as_ref()
                    .map(|c| format!(r#"<small class="catalyst">({})</small>"#, c))
                    .unwrap_or_default();
                format!(
                    r#"<div class="reactant"><span class="chemical">{}</span>{}</div>"#,
                    format_chemicals(&r.formula),
                    catalyst
                )
            })
            .collect::<Vec<_>>()
            .join(" + ");

        let products = self
            .products
            .iter()
            .map(|p| {
                let yield_note = p
                    .yield_percent
                    .map(|y| format!(r#"<small class="yield">{}% yield</small>"#, y))
                    .unwrap_or_default();
                format!(
                    r#"<div class="product"><span class="chemical">{}</span>{}</div>"#,
                    format_chemicals(&p.formula),
                    yield_note
                )
            })
            .collect::<Vec<_>>()
            .join(" + ");

        format!(
            r#"<div class="reaction-scheme-advanced"><div class="reaction-reactants">{}</div><div class="reaction-arrow">{}</div><div class="reaction-products">{}</div></div>"#,
            reactants,
            self.arrow.as_deref().unwrap_or("→"),
            products
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_reaction() {
        let html = render_reaction("CH3OH+HCl -> CH3Cl+H2O", Some("ZnCl2")).unwrap();
        assert_eq!(
            html,
            concat!(
                r#"<div class="reaction-equation"><span class="reactants">CH<sub>3</sub>OH + HCl </span>"#,
                r#"<span class="reaction-arrow">→</span><span class="products"> CH<sub>3</sub>Cl + H<sub>2</sub>O</span></div>"#,
                r#"<div class="reaction-conditions">Conditions: ZnCl2</div>"#
            )
        );
    }

    #[test]
    fn test_render_requires_one_arrow() {
        assert_eq!(render_reaction("A + B", None), None);
        assert_eq!(render_reaction("A -> B -> C", None), None);
        assert!(!render_reaction("A -> B", Some("")).unwrap().contains("reaction-conditions"));
    }

    #[test]
    fn test_structured_reaction() {
        let data: ReactionData = serde_json::from_str(
            r#"{"reactants":[{"formula":"C2H4"},{"formula":"H2O","catalyst":"H3PO4"}],"products":[{"formula":"C2H5OH","yield":95}]}"#,
        )
        .unwrap();
        let html = data.render();
        assert!(html.contains(r#"<small class="catalyst">(H3PO4)</small>"#));
        assert!(html.contains(r#"<small class="yield">95% yield</small>"#));
        assert!(html.contains(r#"<div class="reaction-arrow">→</div>"#));
        assert!(html.contains("C<sub>2</sub>H<sub>5</sub>OH"));
    }
}
