//! Conversion between stored values and the text shown in widgets.
//!
//! Widgets exchange plain strings. [`prepare_value`] turns user input into
//! an RDF term according to the node's datatype, language, source and
//! transform; [`str_value`] goes the other way. Invalid input yields
//! `None`, which clears the value.

use plume_rdf::namespace::xsd;
use plume_rdf::{Iri, Literal, Term};
use plume_tree::{FormTree, NodeId, Transform};

use crate::vocabulary::Vocabulary;

/// Characters that may not appear in an IRI value.
fn is_forbidden(c: char) -> bool {
    matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`') || c.is_whitespace()
}

/// First character of `raw` that may not appear in an IRI.
#[must_use]
pub fn forbidden_char(raw: &str) -> Option<char> {
    raw.chars().find(|c| is_forbidden(*c))
}

/// What the conversions need to know about a value node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueContext<'a> {
    pub datatype: Option<&'a Iri>,
    /// Language of a language string.
    pub language: Option<&'a str>,
    pub source: Option<&'a Iri>,
    pub transform: Option<Transform>,
    pub read_only: bool,
    /// Language concept labels are read in.
    pub main_language: &'a str,
}

impl<'a> ValueContext<'a> {
    /// Context of value node `id`, `None` for other nodes.
    #[must_use]
    pub fn of(tree: &'a FormTree, id: NodeId) -> Option<Self> {
        let value = tree.value_node(id)?;
        let language = if tree.is_lang_string(id) {
            value.value_language.as_deref()
        } else {
            None
        };
        Some(Self {
            datatype: tree.xsdtype(id),
            language,
            source: value.value_source.as_ref(),
            transform: tree.property(id).and_then(|p| p.transform),
            read_only: tree.is_read_only(id),
            main_language: tree.session().main_language(),
        })
    }

    fn datatype_is(&self, datatype: &str) -> bool {
        self.datatype.is_some_and(|t| t.is(datatype))
    }
}

/// Term to store for the user input `raw`.
pub fn prepare_value<V: Vocabulary>(ctx: &ValueContext<'_>, raw: &str, vocabulary: &V) -> Option<Term> {
    if raw.is_empty() {
        return None;
    }
    if let Some(language) = ctx.language {
        return Some(Literal::lang_string(raw, language).into());
    }
    if let Some(datatype) = ctx.datatype {
        let literal = match datatype.as_str() {
            xsd::BOOLEAN => parse_boolean(raw).map(Literal::boolean),
            xsd::DATE => date_from_str(raw).map(|v| Literal::typed(v, datatype.clone())),
            xsd::DATE_TIME => datetime_from_str(raw).map(|v| Literal::typed(v, datatype.clone())),
            xsd::TIME => time_from_str(raw).map(|v| Literal::typed(v, datatype.clone())),
            xsd::DECIMAL => decimal_from_str(raw).map(|v| Literal::typed(v, datatype.clone())),
            xsd::STRING => Some(Literal::plain(raw)),
            xsd::INTEGER if !raw.chars().all(|c| c.is_ascii_digit()) => None,
            _ => Some(Literal::typed(raw, datatype.clone())),
        };
        return literal.map(Term::from);
    }
    if let Some(source) = ctx.source {
        return vocabulary
            .concept_iri(source, ctx.main_language, raw)
            .map(Term::from);
    }
    let iri = match ctx.transform {
        Some(Transform::Email) => email_to_iri(raw),
        Some(Transform::Phone) => phone_to_iri(raw),
        None => raw.to_owned(),
    };
    if iri.is_empty() || forbidden_char(&iri).is_some() {
        return None;
    }
    Some(Iri::new(iri).into())
}

/// Text displayed for `value`.
///
/// Read-only IRIs and concepts are rendered as an HTML link.
pub fn str_value<V: Vocabulary>(ctx: &ValueContext<'_>, value: &Term, vocabulary: &V) -> Option<String> {
    let text = if let Some(transform) = ctx.transform {
        let prefix = match transform {
            Transform::Email => "mailto:",
            Transform::Phone => "tel:",
        };
        let lexical = value.lexical();
        Some(lexical.strip_prefix(prefix).unwrap_or(lexical).to_owned())
    } else if let Some(source) = ctx.source {
        value
            .as_iri()
            .and_then(|iri| vocabulary.concept_label(source, ctx.main_language, iri))
    } else if ctx.datatype_is(xsd::DATE) {
        str_from_date(value.lexical())
    } else if ctx.datatype_is(xsd::DATE_TIME) {
        str_from_datetime(value.lexical())
    } else if ctx.datatype_is(xsd::TIME) {
        time_from_str(value.lexical())
    } else if ctx.datatype_is(xsd::DECIMAL) {
        decimal_from_str(value.lexical())
    } else if ctx.datatype_is(xsd::INTEGER) {
        let lexical = value.lexical();
        lexical.parse::<i64>().ok().map(|_| lexical.to_owned())
    } else if ctx.datatype_is(xsd::BOOLEAN) {
        parse_boolean(value.lexical()).map(|b| b.to_string())
    } else {
        Some(value.lexical().to_owned())
    };
    let text = text?;
    if !ctx.read_only {
        return Some(text);
    }
    let Some(iri) = value.as_iri() else {
        return Some(text);
    };
    let target = ctx
        .source
        .and_then(|source| vocabulary.concept_link(source, iri))
        .unwrap_or_else(|| iri.clone());
    Some(text_with_link(&text, &target))
}

/// Tooltip of a value: the IRI behind a read-only link.
#[must_use]
pub fn help_text_value(ctx: &ValueContext<'_>, value: Option<&Term>) -> Option<String> {
    if !ctx.read_only {
        return None;
    }
    value.and_then(Term::as_iri).map(|iri| iri.as_str().to_owned())
}

/// HTML anchor for `text` pointing at `iri`.
#[must_use]
pub fn text_with_link(text: &str, iri: &Iri) -> String {
    format!(r#"<a href="{}">{}</a>"#, escape_html(iri.as_str()), escape_html(text))
}

/// Datatype of a property known only through its values: the datatype
/// of the first literal.
#[must_use]
pub fn main_datatype(values: &[Term]) -> Option<Iri> {
    values
        .iter()
        .find_map(Term::as_literal)
        .map(|literal| literal.datatype().clone())
}

/// Move values in `main_language` first, keeping the relative order of
/// the others.
pub fn sort_by_language(values: &mut [Option<Term>], main_language: &str) {
    values.sort_by_key(|value| {
        value
            .as_ref()
            .and_then(Term::as_literal)
            .and_then(Literal::language)
            != Some(main_language)
    });
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn email_to_iri(raw: &str) -> String {
    let address = raw.trim();
    let address = address.strip_prefix("mailto:").unwrap_or(address);
    if address.is_empty() {
        return String::new();
    }
    format!("mailto:{address}")
}

/// `tel:` IRI for a phone number. French numbers are normalised to
/// `tel:+33-X-XX-XX-XX-XX`; elsewhere, blanks between digits become dashes.
fn phone_to_iri(raw: &str) -> String {
    let raw = raw.trim();
    let number = raw.strip_prefix("tel:").unwrap_or(raw).trim();
    let mut compact: String = number
        .chars()
        .filter(|c| !matches!(c, '.' | '-') && !c.is_whitespace())
        .collect();
    if compact.len() == 10
        && compact.starts_with('0')
        && compact.chars().all(|c| c.is_ascii_digit())
    {
        compact = format!("+33{}", &compact[1..]);
    }
    let french = compact.len() == 12
        && compact.starts_with("+33")
        && compact[3..].chars().all(|c| c.is_ascii_digit());
    let formatted = if french {
        let mut out = String::with_capacity(16);
        for (i, c) in compact.chars().enumerate() {
            if i == 3 || (i > 2 && i % 2 == 0) {
                out.push('-');
            }
            out.push(c);
        }
        out
    } else {
        let chars: Vec<char> = number.chars().collect();
        let mut out = String::with_capacity(number.len());
        for (i, c) in chars.iter().enumerate() {
            let between_digits = c.is_whitespace()
                && i > 0
                && chars[i - 1].is_ascii_digit()
                && chars.get(i + 1).is_some_and(char::is_ascii_digit);
            out.push(if between_digits { '-' } else { *c });
        }
        out
    };
    if formatted.is_empty() {
        return String::new();
    }
    format!("tel:{formatted}")
}

fn digits(raw: &str, len: usize) -> Option<u32> {
    if raw.len() != len || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// `YYYY-MM-DD` from `DD/MM/YYYY`, or from a valid ISO date.
fn date_from_str(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let (day, month, year) = if let Some((day, rest)) = raw.split_once('/') {
        let (month, year) = rest.split_once('/')?;
        (day, month, year)
    } else {
        let mut parts = raw.splitn(3, '-');
        let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
        (day, month, year)
    };
    let (day, month, year) = (digits(day, 2)?, digits(month, 2)?, digits(year, 4)?);
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

fn str_from_date(lexical: &str) -> Option<String> {
    let iso = date_from_str(lexical)?;
    let (year, rest) = iso.split_once('-')?;
    let (month, day) = rest.split_once('-')?;
    Some(format!("{day}/{month}/{year}"))
}

/// `HH:MM:SS`, seconds defaulting to 0.
fn time_from_str(raw: &str) -> Option<String> {
    let mut parts = raw.trim().split(':');
    let hours = digits(parts.next()?, 2)?;
    let minutes = digits(parts.next()?, 2)?;
    let seconds = match parts.next() {
        Some(seconds) => digits(seconds.get(..2)?, 2)?,
        None => 0,
    };
    if parts.next().is_some() || hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }
    Some(format!("{hours:02}:{minutes:02}:{seconds:02}"))
}

/// `YYYY-MM-DDTHH:MM:SS` from `DD/MM/YYYY HH:MM:SS` or an ISO date-time.
fn datetime_from_str(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let (date, time) = raw.split_once('T').or_else(|| raw.split_once(' '))?;
    Some(format!("{}T{}", date_from_str(date)?, time_from_str(time)?))
}

fn str_from_datetime(lexical: &str) -> Option<String> {
    let (date, time) = lexical.split_once('T')?;
    Some(format!("{} {}", str_from_date(date)?, time_from_str(time)?))
}

/// Canonical decimal, accepting a comma as separator.
fn decimal_from_str(raw: &str) -> Option<String> {
    let value = raw.trim().replace(',', ".");
    let unsigned = value.strip_prefix(['-', '+']).unwrap_or(&value);
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let valid = !(int.is_empty() && frac.is_empty())
        && int.chars().all(|c| c.is_ascii_digit())
        && frac.chars().all(|c| c.is_ascii_digit());
    valid.then_some(value)
}

#[cfg(test)]
mod tests {
    use plume_rdf::namespace::rdf;

    use super::*;
    use crate::vocabulary::{Concept, ConceptScheme, MemoryVocabulary};

    fn ctx(datatype: Option<&Iri>) -> ValueContext<'_> {
        ValueContext {
            datatype,
            language: None,
            source: None,
            transform: None,
            read_only: false,
            main_language: "fr",
        }
    }

    #[test]
    fn language_strings_take_the_value_language() {
        let langstring = Iri::new(rdf::LANG_STRING);
        let context = ValueContext {
            language: Some("en"),
            ..ctx(Some(&langstring))
        };
        let term = prepare_value(&context, "Title", &MemoryVocabulary::new());
        assert_eq!(term, Some(Literal::lang_string("Title", "en").into()));
        assert_eq!(prepare_value(&context, "", &MemoryVocabulary::new()), None);
    }

    #[test]
    fn dates_round_trip_through_display_format() {
        let date = Iri::new(xsd::DATE);
        let context = ctx(Some(&date));
        let vocabulary = MemoryVocabulary::new();
        let term = prepare_value(&context, "14/07/2021", &vocabulary).expect("date");
        assert_eq!(term.lexical(), "2021-07-14");
        assert_eq!(str_value(&context, &term, &vocabulary).as_deref(), Some("14/07/2021"));
        assert_eq!(prepare_value(&context, "31/13/2021", &vocabulary), None);

        let datetime = Iri::new(xsd::DATE_TIME);
        let context = ctx(Some(&datetime));
        let term = prepare_value(&context, "14/07/2021 08:30:00", &vocabulary).expect("dateTime");
        assert_eq!(term.lexical(), "2021-07-14T08:30:00");
    }

    #[test]
    fn integers_and_decimals_are_validated() {
        let vocabulary = MemoryVocabulary::new();
        let integer = Iri::new(xsd::INTEGER);
        assert!(prepare_value(&ctx(Some(&integer)), "42", &vocabulary).is_some());
        assert_eq!(prepare_value(&ctx(Some(&integer)), "4.2", &vocabulary), None);
        let decimal = Iri::new(xsd::DECIMAL);
        let term = prepare_value(&ctx(Some(&decimal)), "3,14", &vocabulary).expect("decimal");
        assert_eq!(term.lexical(), "3.14");
        assert_eq!(prepare_value(&ctx(Some(&decimal)), "pi", &vocabulary), None);
    }

    #[test]
    fn booleans_accept_explicit_tokens_only() {
        let vocabulary = MemoryVocabulary::new();
        let boolean = Iri::new(xsd::BOOLEAN);
        let context = ctx(Some(&boolean));
        assert_eq!(
            prepare_value(&context, "true", &vocabulary),
            Some(Literal::boolean(true).into())
        );
        assert_eq!(prepare_value(&context, "maybe", &vocabulary), None);
    }

    #[test]
    fn iris_reject_forbidden_characters() {
        let vocabulary = MemoryVocabulary::new();
        let context = ctx(None);
        assert_eq!(
            prepare_value(&context, "https://example.org/a", &vocabulary),
            Some(Iri::new("https://example.org/a").into())
        );
        assert_eq!(prepare_value(&context, "https://example.org/a b", &vocabulary), None);
        assert_eq!(forbidden_char("a{b"), Some('{'));
    }

    #[test]
    fn email_and_phone_transforms() {
        let vocabulary = MemoryVocabulary::new();
        let email = ValueContext {
            transform: Some(Transform::Email),
            ..ctx(None)
        };
        let term = prepare_value(&email, "jon.snow@the-wall.we", &vocabulary).expect("email");
        assert_eq!(term.lexical(), "mailto:jon.snow@the-wall.we");
        assert_eq!(
            str_value(&email, &term, &vocabulary).as_deref(),
            Some("jon.snow@the-wall.we")
        );

        let phone = ValueContext {
            transform: Some(Transform::Phone),
            ..ctx(None)
        };
        let term = prepare_value(&phone, "01 23 45 67 89", &vocabulary).expect("phone");
        assert_eq!(term.lexical(), "tel:+33-1-23-45-67-89");
        let term = prepare_value(&phone, "+1 555 0100", &vocabulary).expect("phone");
        assert_eq!(term.lexical(), "tel:+1-555-0100");
    }

    #[test]
    fn concepts_resolve_through_the_vocabulary() {
        let source = Iri::new("urn:x:themes");
        let concept = Iri::new("urn:x:themes:envi");
        let vocabulary = MemoryVocabulary::new().with_scheme(
            source.clone(),
            ConceptScheme {
                labels: [("fr".to_owned(), "Thèmes".to_owned())].into(),
                concepts: vec![Concept {
                    iri: concept.clone(),
                    labels: [("fr".to_owned(), "Environnement".to_owned())].into(),
                    link: Some(Iri::new("https://example.org/envi")),
                }],
            },
        );
        let context = ValueContext {
            source: Some(&source),
            ..ctx(None)
        };
        assert_eq!(
            prepare_value(&context, "Environnement", &vocabulary),
            Some(concept.clone().into())
        );
        let term = Term::from(concept);
        assert_eq!(str_value(&context, &term, &vocabulary).as_deref(), Some("Environnement"));

        let read_only = ValueContext {
            read_only: true,
            ..context
        };
        assert_eq!(
            str_value(&read_only, &term, &vocabulary).as_deref(),
            Some(r#"<a href="https://example.org/envi">Environnement</a>"#)
        );
        assert_eq!(
            help_text_value(&read_only, Some(&term)).as_deref(),
            Some("urn:x:themes:envi")
        );
    }

    #[test]
    fn links_are_escaped() {
        let link = text_with_link("R&D <lab>", &Iri::new("https://example.org/?a=1&b=2"));
        assert_eq!(
            link,
            r#"<a href="https://example.org/?a=1&amp;b=2">R&amp;D &lt;lab&gt;</a>"#
        );
    }

    #[test]
    fn main_language_values_come_first() {
        let mut values: Vec<Option<Term>> = vec![
            Some(Literal::lang_string("Title", "en").into()),
            Some(Literal::lang_string("Titre", "fr").into()),
            Some(Literal::lang_string("Titolo", "it").into()),
        ];
        sort_by_language(&mut values, "fr");
        let lexicals: Vec<&str> = values.iter().flatten().map(Term::lexical).collect();
        assert_eq!(lexicals, ["Titre", "Title", "Titolo"]);
    }
}
