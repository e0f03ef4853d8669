//! Parsing of free-text model completions into structured analyses
//!
//! Model output is inherently unreliable, so parsing is defensive
//! throughout: a malformed or missing list section degrades to an empty
//! list and marks the result `PartiallyParsed`; only a completion with
//! neither an interpretable category nor relevance fails the document.

use dossier_core::{DocumentAnalysis, DossierError, EntitySet, Relevance, Result};

/// How much of the expected structure the completion actually contained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Every expected section was present and well-formed
    Parsed,
    /// Some sections were missing or malformed and degraded to defaults
    PartiallyParsed,
}

/// A successfully parsed analysis completion
#[derive(Debug, Clone)]
pub struct ParsedAnalysis {
    pub outcome: ParseOutcome,
    pub relevance: Relevance,
    pub analysis: DocumentAnalysis,
}

const DEFAULT_CATEGORY: &str = "Sonstiges";

/// Parse the combined analysis completion
///
/// Returns `ParseFailure` only if neither a `KATEGORIE:` nor a `RELEVANZ:`
/// line can be found; everything else degrades field-by-field.
pub fn parse_analysis(completion: &str) -> Result<ParsedAnalysis> {
    let mut category: Option<String> = None;
    let mut relevance_label: Option<String> = None;
    let mut summary_lines: Vec<String> = Vec::new();
    let mut in_summary = false;

    let mut entities = EntitySet::default();
    let mut sections_seen = [false; 7];

    for line in completion.lines() {
        let line = line.trim();

        let Some((label, value)) = split_label(line) else {
            if in_summary && !line.is_empty() {
                summary_lines.push(line.to_string());
            }
            continue;
        };

        match label.as_str() {
            "KATEGORIE" => {
                in_summary = false;
                if !value.is_empty() {
                    category = Some(strip_brackets(value));
                }
            }
            "RELEVANZ" => {
                in_summary = false;
                if !value.is_empty() {
                    relevance_label = Some(strip_brackets(value));
                }
            }
            "ZUSAMMENFASSUNG" => {
                in_summary = true;
                if !value.is_empty() {
                    summary_lines.push(value.to_string());
                }
            }
            "FIRMEN" => {
                in_summary = false;
                sections_seen[0] = true;
                entities.companies = parse_list_value(value);
            }
            "PERSONEN" => {
                in_summary = false;
                sections_seen[1] = true;
                entities.persons = parse_list_value(value);
            }
            "GELDBETRAEGE" | "GELDBETRÄGE" => {
                in_summary = false;
                sections_seen[2] = true;
                entities.amounts = parse_list_value(value);
            }
            "DATEN" => {
                in_summary = false;
                sections_seen[3] = true;
                entities.dates = parse_list_value(value);
            }
            "IBANS" => {
                in_summary = false;
                sections_seen[4] = true;
                entities.identifiers.extend(parse_list_value(value));
            }
            "STEUERNUMMERN" => {
                in_summary = false;
                sections_seen[5] = true;
                entities.identifiers.extend(parse_list_value(value));
            }
            "AUFFAELLIGKEITEN" | "AUFFÄLLIGKEITEN" => {
                in_summary = false;
                sections_seen[6] = true;
                entities.anomalies = parse_list_value(value);
            }
            _ => {
                // Unknown label; inside a summary block it is content
                if in_summary && !line.is_empty() {
                    summary_lines.push(line.to_string());
                }
            }
        }
    }

    if category.is_none() && relevance_label.is_none() {
        return Err(DossierError::ParseFailure(
            "completion contains neither a category nor a relevance line".to_string(),
        ));
    }

    let relevance_recognized = relevance_label
        .as_deref()
        .map(is_recognized_relevance)
        .unwrap_or(false);
    let relevance = Relevance::coerce(relevance_label.as_deref().unwrap_or(""));

    let summary = summary_lines.join(" ");

    let complete = category.is_some()
        && relevance_recognized
        && !summary.is_empty()
        && sections_seen.iter().all(|&seen| seen);

    Ok(ParsedAnalysis {
        outcome: if complete {
            ParseOutcome::Parsed
        } else {
            ParseOutcome::PartiallyParsed
        },
        relevance,
        analysis: DocumentAnalysis {
            category: category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            summary,
            entities,
        },
    })
}

/// Parse only the entity sections of a completion (standalone extraction)
pub fn parse_entity_sections(completion: &str) -> EntitySet {
    let mut entities = EntitySet::default();

    for line in completion.lines() {
        let Some((label, value)) = split_label(line.trim()) else {
            continue;
        };

        match label.as_str() {
            "FIRMEN" => entities.companies = parse_list_value(value),
            "PERSONEN" => entities.persons = parse_list_value(value),
            "GELDBETRAEGE" | "GELDBETRÄGE" => entities.amounts = parse_list_value(value),
            "DATEN" => entities.dates = parse_list_value(value),
            "IBANS" | "STEUERNUMMERN" => entities.identifiers.extend(parse_list_value(value)),
            "AUFFAELLIGKEITEN" | "AUFFÄLLIGKEITEN" => {
                entities.anomalies = parse_list_value(value)
            }
            _ => {}
        }
    }

    entities
}

/// Split a `LABEL: value` line, tolerating markdown decoration on the label
fn split_label(line: &str) -> Option<(String, &str)> {
    let (head, rest) = line.split_once(':')?;
    let label = head
        .trim()
        .trim_matches(|c| c == '*' || c == '#' || c == '-' || c == ' ')
        .to_uppercase();

    if label.is_empty() || label.len() > 40 {
        return None;
    }

    Some((label, rest.trim()))
}

/// Parse one list-valued section into entries
///
/// `keine`/`-`/`n/a`/`[]` and friends mean an explicitly empty list.
fn parse_list_value(value: &str) -> Vec<String> {
    let value = value.trim();
    let lowered = value.to_lowercase();
    if value.is_empty()
        || matches!(
            lowered.as_str(),
            "keine" | "keine gefunden" | "-" | "[]" | "n/a"
        )
    {
        return Vec::new();
    }

    value
        .trim_matches(|c| c == '[' || c == ']')
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|item| !item.is_empty() && item.to_lowercase() != "keine")
        .map(|item| item.to_string())
        .collect()
}

fn strip_brackets(value: &str) -> String {
    value
        .trim_matches(|c| c == '[' || c == ']')
        .trim()
        .to_string()
}

fn is_recognized_relevance(label: &str) -> bool {
    let label = label.trim().to_lowercase();
    label.starts_with("hoch") || label.starts_with("mittel") || label.starts_with("gering")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_core::AnalysisErrorKind;

    const WELL_FORMED: &str = r#"KATEGORIE: Rechnung
RELEVANZ: hoch

ZUSAMMENFASSUNG:
Die ABC GmbH stellt der XYZ AG 12.500 EUR in Rechnung.
Zahlungsziel ist der 15.02.2024.

FIRMEN: ABC GmbH, XYZ AG
PERSONEN: Hans Gruber
GELDBETRAEGE: 12.500 EUR
DATEN: 15.02.2024
IBANS: DE89 3704 0044 0532 0130 00
STEUERNUMMERN: keine
AUFFAELLIGKEITEN: keine"#;

    #[test]
    fn test_well_formed_completion_is_fully_parsed() {
        let parsed = parse_analysis(WELL_FORMED).unwrap();
        assert_eq!(parsed.outcome, ParseOutcome::Parsed);
        assert_eq!(parsed.relevance, Relevance::Hoch);
        assert_eq!(parsed.analysis.category, "Rechnung");
        assert!(parsed.analysis.summary.contains("12.500 EUR"));
        assert_eq!(
            parsed.analysis.entities.companies,
            vec!["ABC GmbH", "XYZ AG"]
        );
        assert_eq!(parsed.analysis.entities.persons, vec!["Hans Gruber"]);
        assert_eq!(parsed.analysis.entities.amounts, vec!["12.500 EUR"]);
        assert_eq!(
            parsed.analysis.entities.identifiers,
            vec!["DE89 3704 0044 0532 0130 00"]
        );
        assert!(parsed.analysis.entities.anomalies.is_empty());
    }

    #[test]
    fn test_missing_sections_degrade_to_partial() {
        let completion = "KATEGORIE: Vertrag\nRELEVANZ: mittel\n\nZUSAMMENFASSUNG:\nEin Vertrag.";
        let parsed = parse_analysis(completion).unwrap();
        assert_eq!(parsed.outcome, ParseOutcome::PartiallyParsed);
        assert_eq!(parsed.analysis.category, "Vertrag");
        assert!(parsed.analysis.entities.is_empty());
    }

    #[test]
    fn test_unknown_relevance_coerces_to_gering_and_partial() {
        let completion = WELL_FORMED.replace("RELEVANZ: hoch", "RELEVANZ: extrem wichtig");
        let parsed = parse_analysis(&completion).unwrap();
        assert_eq!(parsed.relevance, Relevance::Gering);
        assert_eq!(parsed.outcome, ParseOutcome::PartiallyParsed);
    }

    #[test]
    fn test_bracketed_values_are_stripped() {
        let completion = "KATEGORIE: [Rechnung]\nRELEVANZ: [gering]\nFIRMEN: [Alpha GmbH, Beta KG]";
        let parsed = parse_analysis(completion).unwrap();
        assert_eq!(parsed.analysis.category, "Rechnung");
        assert_eq!(parsed.relevance, Relevance::Gering);
        assert_eq!(
            parsed.analysis.entities.companies,
            vec!["Alpha GmbH", "Beta KG"]
        );
    }

    #[test]
    fn test_markdown_decorated_labels() {
        let completion = "**KATEGORIE:** E-Mail\n**RELEVANZ:** hoch";
        let parsed = parse_analysis(completion).unwrap();
        assert_eq!(parsed.analysis.category, "E-Mail");
        assert_eq!(parsed.relevance, Relevance::Hoch);
    }

    #[test]
    fn test_uninterpretable_completion_is_parse_failure() {
        let err = parse_analysis("Das Dokument handelt von vielen Dingen.").unwrap_err();
        assert_eq!(err.kind(), Some(AnalysisErrorKind::ParseFailure));
    }

    #[test]
    fn test_relevance_only_completion_is_accepted() {
        // Category missing, relevance present: degraded, not failed
        let parsed = parse_analysis("RELEVANZ: mittel").unwrap();
        assert_eq!(parsed.outcome, ParseOutcome::PartiallyParsed);
        assert_eq!(parsed.relevance, Relevance::Mittel);
        assert_eq!(parsed.analysis.category, "Sonstiges");
    }

    #[test]
    fn test_empty_list_markers() {
        for marker in ["keine", "Keine gefunden", "-", "[]", "n/a", ""] {
            assert!(
                parse_list_value(marker).is_empty(),
                "{marker:?} should parse as empty"
            );
        }
    }

    #[test]
    fn test_list_entries_are_cleaned() {
        let entries = parse_list_value(r#"["ABC GmbH", 'XYZ AG' , keine,  ]"#);
        assert_eq!(entries, vec!["ABC GmbH", "XYZ AG"]);
    }

    #[test]
    fn test_ibans_and_tax_numbers_merge_into_identifiers() {
        let set = parse_entity_sections(
            "IBANS: DE02 1203 0000 0000 2020 51\nSTEUERNUMMERN: 151/815/08156",
        );
        assert_eq!(
            set.identifiers,
            vec!["DE02 1203 0000 0000 2020 51", "151/815/08156"]
        );
    }
}
