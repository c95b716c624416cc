//! Decode, transform, and encode in one pass.

use gridx_model::{Column, RecordSet};

use crate::bridge::{from_document, to_document};
use crate::encoding::DocumentEncoding;
use crate::error::TransformError;
use crate::merger::RecordMerger;
use crate::rules::RuleSet;
use crate::tree::Document;

/// A document encoding paired with the rule set applied to every document.
#[derive(Debug, Clone, Default)]
pub struct TransformPipeline {
    encoding: DocumentEncoding,
    rules: RuleSet,
}

impl TransformPipeline {
    pub fn new(encoding: DocumentEncoding, rules: RuleSet) -> Self {
        Self { encoding, rules }
    }

    /// Builds a pipeline from rule text; blank text is the identity.
    pub fn with_rule_text(encoding: DocumentEncoding, rules: &str) -> Result<Self, TransformError> {
        Ok(Self::new(encoding, RuleSet::parse(rules)?))
    }

    pub fn encoding(&self) -> DocumentEncoding {
        self.encoding
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Decodes `text`, applies the rules, and encodes the result.
    pub fn apply(&self, text: &str) -> Result<String, TransformError> {
        let document = self
            .encoding
            .decode(text)
            .map_err(TransformError::failure)?;
        self.finish(document)
    }

    /// Renders a record set as a transformed document.
    pub fn export(&self, records: &RecordSet, table_name: &str) -> Result<String, TransformError> {
        let document = to_document(records, table_name);
        self.finish(document)
    }

    /// Decodes and transforms a document, then reads its first table.
    pub fn import(&self, text: &str) -> Result<RecordSet, TransformError> {
        let document = self
            .encoding
            .decode(text)
            .map_err(TransformError::failure)?;
        let document = self.rules.apply(document);
        from_document(&document).map_err(TransformError::result_parse)
    }

    /// Imports each fragment and merges the results.
    ///
    /// `fallback` supplies the columns when no fragment holds a row.
    pub fn import_all<'a, I>(&self, fragments: I, fallback: &[Column]) -> Result<RecordSet, TransformError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let parts = fragments
            .into_iter()
            .map(|fragment| self.import(fragment))
            .collect::<Result<Vec<_>, _>>()?;
        RecordMerger::new(fallback.to_vec())
            .merge(parts)
            .map_err(TransformError::result_parse)
    }

    fn finish(&self, document: Document) -> Result<String, TransformError> {
        let document = self.rules.apply(document);
        self.encoding
            .encode(&document)
            .map_err(TransformError::result_parse)
    }
}
