use crate::xpath::errors::SelectorError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Leading character that marks a component as an attribute reference.
pub const ATTRIBUTE_SENTINEL: char = '@';

/// Attribute-equality predicate: `[@name="value"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeMatch {
    /// Attribute name without the `@` sentinel
    pub name: String,
    pub value: String,
}

/// The single optional qualifier a component may carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// 1-based ordinal among same-named siblings
    Position(usize),
    AttributeMatch(AttributeMatch),
}

/// One `/`-separated step of a selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathComponent {
    name: String,
    predicate: Option<Predicate>,
}

impl PathComponent {
    pub fn new(name: impl Into<String>, predicate: Option<Predicate>) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }

    /// Raw component name, including the `@` sentinel for attributes.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn position(&self) -> Option<usize> {
        match self.predicate {
            Some(Predicate::Position(position)) => Some(position),
            _ => None,
        }
    }

    pub fn attribute_match(&self) -> Option<&AttributeMatch> {
        match &self.predicate {
            Some(Predicate::AttributeMatch(matcher)) => Some(matcher),
            _ => None,
        }
    }

    pub fn is_attribute(&self) -> bool {
        self.name.starts_with(ATTRIBUTE_SENTINEL)
    }

    /// Attribute name with the sentinel stripped, if this is an attribute reference.
    pub fn attribute_name(&self) -> Option<&str> {
        self.name.strip_prefix(ATTRIBUTE_SENTINEL)
    }
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match &self.predicate {
            None => Ok(()),
            Some(Predicate::Position(position)) => write!(f, "[{position}]"),
            Some(Predicate::AttributeMatch(AttributeMatch { name, value })) => {
                let quote = if value.contains('"') { '\'' } else { '"' };
                write!(f, "[{ATTRIBUTE_SENTINEL}{name}={quote}{value}{quote}]")
            }
        }
    }
}

/// A parsed selector such as `/MPD/Period[@id="p1"]/AdaptationSet[2]/@lang`.
///
/// Always holds at least one component and is never mutated after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    components: Vec<PathComponent>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let segments = split_segments(input);
        if segments.is_empty() {
            return Err(SelectorError::Empty {
                selector: input.to_string(),
            });
        }

        let last = segments.len() - 1;
        let mut components = Vec::with_capacity(segments.len());
        for (idx, segment) in segments.into_iter().enumerate() {
            let component = parse_component(input, segment)?;
            if component.is_attribute() && idx != last {
                return Err(SelectorError::AttributeNotLast {
                    selector: input.to_string(),
                    component: segment.to_string(),
                });
            }
            components.push(component);
        }

        Ok(Self { components })
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    /// The final component, which names the element or attribute being targeted.
    pub fn leaf_component(&self) -> &PathComponent {
        &self.components[self.components.len() - 1]
    }

    pub fn targets_attribute(&self) -> bool {
        self.leaf_component().is_attribute()
    }

    pub fn targets_element(&self) -> bool {
        !self.targets_attribute()
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in &self.components {
            write!(f, "/{component}")?;
        }
        Ok(())
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Split on `/`, ignoring separators inside a bracketed predicate or a quoted
/// literal, and drop empty segments (a leading `/` is optional).
fn split_segments(input: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (idx, ch) in input.char_indices() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' if depth > 0 => quote = Some(ch),
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                segments.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    segments.push(&input[start..]);

    segments.retain(|segment| !segment.is_empty());
    segments
}

fn parse_component(selector: &str, segment: &str) -> Result<PathComponent, SelectorError> {
    let malformed = |message: &str| SelectorError::MalformedComponent {
        selector: selector.to_string(),
        component: segment.to_string(),
        message: message.to_string(),
    };

    let (name, body) = match segment.find('[') {
        Some(open) => {
            let body = segment[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| malformed("predicate must end the component with ']'"))?;
            (&segment[..open], Some(body))
        }
        None => (segment, None),
    };

    if name.contains("::") {
        return Err(malformed("axis expressions are not supported"));
    }
    let is_attribute = name.starts_with(ATTRIBUTE_SENTINEL);
    let bare = name.strip_prefix(ATTRIBUTE_SENTINEL).unwrap_or(name);
    if !is_valid_name(bare) {
        return Err(malformed(
            "expected an element or @attribute name (wildcards and functions are not supported)",
        ));
    }

    let predicate = match body {
        None => None,
        Some(_) if is_attribute => {
            return Err(malformed("attribute references cannot carry a predicate"));
        }
        Some(body) => Some(parse_predicate(body).map_err(malformed)?),
    };

    Ok(PathComponent::new(name, predicate))
}

fn parse_predicate(body: &str) -> Result<Predicate, &'static str> {
    if body.is_empty() {
        return Err("empty predicate");
    }

    let Some(eq) = body.find('=') else {
        return parse_position(body);
    };

    let attribute = &body[..eq];
    let attribute = attribute
        .strip_prefix(ATTRIBUTE_SENTINEL)
        .unwrap_or(attribute);
    if !is_valid_name(attribute) {
        return Err("predicate must be a position or a single attribute comparison");
    }

    let value = parse_literal(&body[eq + 1..])?;
    Ok(Predicate::AttributeMatch(AttributeMatch {
        name: attribute.to_string(),
        value,
    }))
}

fn parse_position(token: &str) -> Result<Predicate, &'static str> {
    if !token.chars().all(|ch| ch.is_ascii_digit()) {
        return Err("positional predicate must be a positive integer");
    }
    match token.parse::<usize>() {
        Ok(position) if position > 0 => Ok(Predicate::Position(position)),
        Ok(_) => Err("positions start at 1"),
        Err(_) => Err("positional predicate is out of range"),
    }
}

fn parse_literal(raw: &str) -> Result<String, &'static str> {
    let mut chars = raw.chars();
    match chars.next() {
        Some(open @ ('"' | '\'')) => {
            let inner = raw[1..]
                .strip_suffix(open)
                .ok_or("unterminated quoted literal")?;
            if inner.contains(open) {
                return Err("only one comparison is allowed per predicate");
            }
            Ok(inner.to_string())
        }
        Some(_) => {
            if raw.contains(['"', '\'', '[', ']', '=']) {
                return Err("unquoted literal contains reserved characters");
            }
            if raw.chars().any(char::is_whitespace) {
                return Err("unquoted literal cannot contain whitespace");
            }
            Ok(raw.to_string())
        }
        None => Err("missing literal after '='"),
    }
}

/// XML-style name with an optional namespace prefix.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    if name.starts_with(':') || name.ends_with(':') || name.matches(':').count() > 1 {
        return false;
    }
    chars.all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':'))
}
