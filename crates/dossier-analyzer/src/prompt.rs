//! Prompt builders for the analysis tasks
//!
//! All prompts are German; the documents and the investigators are. Each
//! builder demands a rigid output format so the parser has labeled blocks
//! to work with.

/// Combined per-document analysis: category, relevance, summary, entities
pub fn build_analysis_prompt(filename: &str, text: &str) -> String {
    format!(
        r#"Analysiere das folgende Dokument aus einem Ermittlungsverfahren und gib eine strukturierte Antwort.

DOKUMENT ({filename}):
{text}

Antworte im folgenden Format:

KATEGORIE: [E-Mail/Rechnung/Vertrag/Protokoll/Finanzbericht/Sonstiges]
RELEVANZ: [hoch/mittel/gering]

ZUSAMMENFASSUNG:
[3-4 Sätze]

FIRMEN: [Liste oder "keine"]
PERSONEN: [Liste oder "keine"]
GELDBETRAEGE: [Liste oder "keine"]
DATEN: [Liste oder "keine"]
IBANS: [Liste oder "keine"]
STEUERNUMMERN: [Liste oder "keine"]
AUFFAELLIGKEITEN: [Liste ungewöhnlicher Aspekte oder "keine"]

Analyse:"#
    )
}

/// Standalone summary of a text
pub fn build_summarize_prompt(text: &str) -> String {
    format!(
        r#"Fasse folgenden Text in 3-4 prägnanten Sätzen auf Deutsch zusammen.
Fokussiere auf die wichtigsten Fakten: Wer, Was, Wann, Wie viel.

Text:
{text}

Zusammenfassung:"#
    )
}

/// Standalone classification into exactly one category
pub fn build_classify_prompt(text: &str) -> String {
    format!(
        r#"Klassifiziere den folgenden Text in GENAU EINE dieser Kategorien:
- E-Mail
- Rechnung
- Vertrag
- Protokoll
- Finanzbericht
- Sonstiges

Antworte NUR mit dem Kategorienamen, nichts anderes!

Text:
{text}

Kategorie:"#
    )
}

/// Standalone entity extraction
pub fn build_entity_prompt(text: &str) -> String {
    format!(
        r#"Extrahiere alle relevanten Entitäten aus dem folgenden Text.

Antworte im folgenden Format (eine Zeile pro Kategorie, "keine" wenn nichts gefunden):
FIRMEN: [Liste]
PERSONEN: [Liste]
GELDBETRAEGE: [Liste]
DATEN: [Liste]
IBANS: [Liste]
STEUERNUMMERN: [Liste]
AUFFAELLIGKEITEN: [Liste]

Text:
{text}

Extrahierte Entitäten:"#
    )
}

/// Question answering constrained to the given text
pub fn build_question_prompt(text: &str, question: &str) -> String {
    format!(
        r#"Beantworte die folgende Frage basierend NUR auf dem gegebenen Text.
Wenn die Antwort nicht im Text steht, sage "Information nicht im Text gefunden."

Text:
{text}

Frage: {question}

Antwort:"#
    )
}
