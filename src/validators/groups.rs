//! Sequence and choice model groups
//!
//! A [`Sequence`] lists the element fields of a model in document order;
//! a [`Choice`] inside it accepts one of several alternatives, each a
//! single element or an ordered group of elements. Matching works on the
//! set of element tags present in an instance, not on positions.

use super::particles::Occurs;
use crate::error::{Error, Result};
use crate::error_map::{ErrorMap, EXTRA_KEY, SEQUENCE_KEY};
use indexmap::{IndexMap, IndexSet};
use log::debug;
use std::fmt;

/// An element particle: a tag with occurrence bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceElement {
    /// Tag (field name) of the element
    pub tag: String,
    /// Occurrence bounds
    pub occurs: Occurs,
}

impl SequenceElement {
    /// Create a new element particle
    pub fn new(tag: impl Into<String>, occurs: Occurs) -> Self {
        Self {
            tag: tag.into(),
            occurs,
        }
    }

    /// Element that must occur exactly once
    pub fn required(tag: impl Into<String>) -> Self {
        Self::new(tag, Occurs::once())
    }

    /// Element that may occur at most once
    pub fn optional(tag: impl Into<String>) -> Self {
        Self::new(tag, Occurs::optional())
    }
}

/// One alternative of a choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceOption {
    /// A single element
    Element(SequenceElement),
    /// An ordered group of elements
    Group(Vec<SequenceElement>),
}

impl ChoiceOption {
    /// Elements of this alternative in order
    pub fn elements(&self) -> &[SequenceElement] {
        match self {
            ChoiceOption::Element(element) => std::slice::from_ref(element),
            ChoiceOption::Group(elements) => elements,
        }
    }

    fn required_tags(&self) -> impl Iterator<Item = &str> {
        self.elements()
            .iter()
            .filter(|e| e.occurs.is_required())
            .map(|e| e.tag.as_str())
    }

    /// Present tags cover the required tags and stay within the allowed ones
    fn matches(&self, present: &IndexSet<&str>) -> bool {
        self.required_tags().all(|tag| present.contains(tag))
            && present
                .iter()
                .all(|tag| self.elements().iter().any(|e| e.tag == *tag))
    }
}

impl fmt::Display for ChoiceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceOption::Element(element) => write!(f, "{}", element.tag),
            ChoiceOption::Group(elements) => {
                let tags: Vec<&str> = elements.iter().map(|e| e.tag.as_str()).collect();
                write!(f, "({})", tags.join(", "))
            }
        }
    }
}

/// Exclusive choice between alternatives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Alternatives in declaration order
    pub options: Vec<ChoiceOption>,
    /// Whether one alternative must be present
    pub required: bool,
}

impl Choice {
    /// Create an empty required choice
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            required: true,
        }
    }

    /// Add a single-element alternative
    pub fn element(mut self, element: SequenceElement) -> Self {
        self.options.push(ChoiceOption::Element(element));
        self
    }

    /// Add a group alternative
    pub fn group(mut self, elements: impl IntoIterator<Item = SequenceElement>) -> Self {
        self.options
            .push(ChoiceOption::Group(elements.into_iter().collect()));
        self
    }

    /// Make the whole choice optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Every tag mentioned by any alternative
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .flat_map(|o| o.elements().iter().map(|e| e.tag.as_str()))
    }
}

impl Default for Choice {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options: Vec<String> = self.options.iter().map(|o| o.to_string()).collect();
        write!(f, "({})", options.join(" | "))
    }
}

/// A particle of a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceParticle {
    /// Element particle
    Element(SequenceElement),
    /// Choice group
    Choice(Choice),
}

/// Result of matching the present element tags against a sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceMatch {
    /// Present tags in output order
    pub order: Vec<String>,
    /// Violations keyed by tag, `_sequence` or `_extra`
    pub errors: ErrorMap,
}

/// Ordered content model of a model's elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    particles: Vec<SequenceParticle>,
}

impl Sequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element particle
    pub fn element(mut self, tag: impl Into<String>, occurs: Occurs) -> Self {
        self.particles
            .push(SequenceParticle::Element(SequenceElement::new(tag, occurs)));
        self
    }

    /// Append a choice group
    pub fn choice(mut self, choice: Choice) -> Self {
        self.particles.push(SequenceParticle::Choice(choice));
        self
    }

    /// Particles in order
    pub fn particles(&self) -> &[SequenceParticle] {
        &self.particles
    }

    /// Every tag mentioned by the sequence, in order
    pub fn tags(&self) -> Vec<&str> {
        let mut tags = Vec::new();
        for particle in &self.particles {
            match particle {
                SequenceParticle::Element(element) => tags.push(element.tag.as_str()),
                SequenceParticle::Choice(choice) => tags.extend(choice.tags()),
            }
        }
        tags
    }

    /// Check the sequence definition: no tag twice, consistent bounds
    pub fn validate(&self) -> Result<()> {
        let mut seen = IndexSet::new();
        for tag in self.tags() {
            if !seen.insert(tag) {
                return Err(Error::Schema(format!(
                    "tag '{}' appears more than once in the sequence",
                    tag
                )));
            }
        }
        for particle in &self.particles {
            match particle {
                SequenceParticle::Element(element) => element.occurs.validate()?,
                SequenceParticle::Choice(choice) => {
                    if choice.options.is_empty() {
                        return Err(Error::Schema("choice without options".to_string()));
                    }
                    for option in &choice.options {
                        for element in option.elements() {
                            element.occurs.validate()?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Match present element tags (with their occurrence counts)
    ///
    /// Every particle is checked; failures never stop the walk.
    pub fn match_tags(&self, present: &IndexMap<String, usize>) -> SequenceMatch {
        let mut result = SequenceMatch::default();
        let mut placed: IndexSet<&str> = IndexSet::new();

        let place = |element: &SequenceElement, result: &mut SequenceMatch| -> bool {
            match present.get(&element.tag) {
                Some(count) => {
                    if let Some(message) = element.occurs.check(*count) {
                        result.errors.add(element.tag.as_str(), message);
                    }
                    result.order.push(element.tag.clone());
                    true
                }
                None => false,
            }
        };

        for particle in &self.particles {
            match particle {
                SequenceParticle::Element(element) => {
                    if place(element, &mut result) {
                        placed.insert(element.tag.as_str());
                    } else if element.occurs.is_required() {
                        result
                            .errors
                            .add(element.tag.as_str(), "missing required element");
                    }
                }
                SequenceParticle::Choice(choice) => {
                    let keys: IndexSet<&str> = choice
                        .tags()
                        .filter(|tag| present.contains_key(*tag))
                        .collect();
                    if keys.is_empty() && !choice.required {
                        continue;
                    }

                    match choice.options.iter().position(|o| o.matches(&keys)) {
                        Some(index) => {
                            debug!("Matched keys {:?} with option {} of {}", keys, index, choice);
                            for element in choice.options[index].elements() {
                                if place(element, &mut result) {
                                    placed.insert(element.tag.as_str());
                                }
                            }
                        }
                        None => {
                            let listed: Vec<&str> = keys.iter().copied().collect();
                            let listed = if listed.is_empty() {
                                "(none)".to_string()
                            } else {
                                listed.join(", ")
                            };
                            result.errors.add(
                                SEQUENCE_KEY,
                                format!("Could not match keys: {} with choices: {}", listed, choice),
                            );
                            // keep the output complete even when the choice failed
                            for tag in keys {
                                result.order.push(tag.to_string());
                                placed.insert(tag);
                            }
                        }
                    }
                }
            }
        }

        let extra: Vec<&str> = present
            .keys()
            .map(|k| k.as_str())
            .filter(|tag| !placed.contains(tag))
            .collect();
        if !extra.is_empty() {
            result
                .errors
                .add(EXTRA_KEY, format!("Could not match tag(s): {}", extra.join(", ")));
            result.order.extend(extra.iter().map(|t| t.to_string()));
        }

        result
    }
}
