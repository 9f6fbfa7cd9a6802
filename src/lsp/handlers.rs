use std::panic::{self, AssertUnwindSafe};

use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types as lsp;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionParams, CompletionResponse, ConfigurationItem,
    DiagnosticSeverity, DocumentSymbol, DocumentSymbolParams, DocumentSymbolResponse, Documentation,
    Hover, HoverContents, HoverParams, MarkupContent, MarkupKind, NumberOrString, SymbolKind, Url,
};

use crate::core::position::{byte_offset, utf16_column, utf16_len};
use crate::core::{Position, Range, Severity};
use crate::lsp::backend::{Backend, CONFIG_SECTION};
use crate::lsp::document::DocumentState;
use crate::parser::{lex_line, TokenKind};
use crate::schema::{
    InstructionKind, InstructionSpec, OptionKind, OptionOperator, OptionSpec, Schema,
};
use crate::validation::{self, DiagnosticConfig, DiagnosticSettings};

/// Trait for handling hover requests
#[tower_lsp::async_trait]
pub trait HandleHover {
    async fn handle_hover(&self, params: HoverParams) -> LspResult<Option<Hover>>;
}

/// Trait for handling completion requests
#[tower_lsp::async_trait]
pub trait HandleCompletion {
    async fn handle_completion(
        &self,
        params: CompletionParams,
    ) -> LspResult<Option<CompletionResponse>>;
}

/// Trait for handling document symbols
#[tower_lsp::async_trait]
pub trait HandleDocumentSymbol {
    async fn handle_document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> LspResult<Option<DocumentSymbolResponse>>;
}

/// Trait for handling diagnostics
#[tower_lsp::async_trait]
pub trait HandleDiagnostics {
    /// Effective rule levels for one document
    async fn diagnostic_config(&self, uri: &Url) -> DiagnosticConfig;
    async fn publish_diagnostics(&self, uri: Url);
    /// Re-run validation for every open document
    async fn revalidate_all(&self);
}

#[tower_lsp::async_trait]
impl HandleHover for Backend {
    async fn handle_hover(&self, params: HoverParams) -> LspResult<Option<Hover>> {
        let tdpp = params.text_document_position_params;
        let pos = Position::new(tdpp.position.line, tdpp.position.character);

        let Some(doc_state) = self.document(&tdpp.text_document.uri).await else {
            return Ok(None);
        };

        Ok(hover_at(&doc_state, &self.schema, pos))
    }
}

#[tower_lsp::async_trait]
impl HandleCompletion for Backend {
    async fn handle_completion(
        &self,
        params: CompletionParams,
    ) -> LspResult<Option<CompletionResponse>> {
        let tdp = params.text_document_position;
        let pos = Position::new(tdp.position.line, tdp.position.character);

        let Some(doc_state) = self.document(&tdp.text_document.uri).await else {
            return Ok(None);
        };

        let items = completions_at(&doc_state, &self.schema, pos);
        if items.is_empty() {
            return Ok(None);
        }
        Ok(Some(CompletionResponse::Array(items)))
    }
}

#[tower_lsp::async_trait]
impl HandleDocumentSymbol for Backend {
    async fn handle_document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> LspResult<Option<DocumentSymbolResponse>> {
        let Some(doc_state) = self.document(&params.text_document.uri).await else {
            return Ok(None);
        };

        Ok(Some(DocumentSymbolResponse::Nested(document_symbols(
            &doc_state,
            &self.schema,
        ))))
    }
}

#[tower_lsp::async_trait]
impl HandleDiagnostics for Backend {
    async fn diagnostic_config(&self, uri: &Url) -> DiagnosticConfig {
        let (supports_configuration, file, global) = {
            let settings = self.settings.read().await;
            (
                settings.supports_configuration,
                settings.file.clone(),
                settings.global.clone(),
            )
        };

        let client_settings = if supports_configuration {
            let item = ConfigurationItem {
                scope_uri: Some(uri.clone()),
                section: Some(CONFIG_SECTION.to_string()),
            };
            match self.client.configuration(vec![item]).await {
                Ok(values) => values
                    .first()
                    .map(DiagnosticSettings::from_json)
                    .unwrap_or_default(),
                Err(e) => {
                    log::warn!("workspace/configuration failed for {}: {}", uri, e);
                    global
                }
            }
        } else {
            global
        };

        DiagnosticConfig::from_settings(&client_settings.merged_over(&file))
    }

    /// Publish diagnostics for a document
    async fn publish_diagnostics(&self, uri: Url) {
        let Some(doc_state) = self.document(&uri).await else {
            return;
        };

        let config = self.diagnostic_config(&uri).await;
        let schema = self.schema.clone();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            validation::validate(&doc_state.document, &schema, &config)
        }));

        let diagnostics = match result {
            Ok(diagnostics) => diagnostics.iter().map(to_lsp_diagnostic).collect(),
            Err(_) => {
                log::error!("Validation panicked for {}; publishing no diagnostics", uri);
                Vec::new()
            }
        };

        self.client
            .publish_diagnostics(uri, diagnostics, doc_state.version)
            .await;
    }

    async fn revalidate_all(&self) {
        let uris: Vec<Url> = self.documents.lock().await.keys().cloned().collect();
        log::debug!("Revalidating {} open documents", uris.len());
        for uri in uris {
            self.publish_diagnostics(uri).await;
        }
    }
}

/// Markdown hover for the instruction name or option key under `pos`
pub fn hover_at(doc_state: &DocumentState, schema: &Schema, pos: Position) -> Option<Hover> {
    let line = doc_state.line(pos.line)?;
    let token = lex_line(line, pos.line);

    match token.kind {
        TokenKind::Instruction { full_name, base_name } => {
            let dollar = line.find('$')?;
            let name_range = Range::on_line(
                pos.line,
                utf16_column(line, dollar),
                utf16_column(line, dollar + full_name.len()),
            );
            if !name_range.contains(pos) {
                return None;
            }
            let spec = schema.find_instruction(&base_name)?;
            Some(markdown_hover(instruction_markdown(spec), name_range))
        }
        TokenKind::Option(option) => {
            if !option.key_range.contains(pos) {
                return None;
            }
            let instruction = doc_state.document.instruction_at_line(pos.line)?;
            let spec = schema.find_option(&instruction.base_name, &option.key)?;
            Some(markdown_hover(
                option_markdown(spec, &instruction.name),
                option.key_range,
            ))
        }
        _ => None,
    }
}

fn markdown_hover(value: String, range: Range) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: Some(to_lsp_range(range)),
    }
}

fn instruction_markdown(spec: &InstructionSpec) -> String {
    let mut text = format!("**${}** ({})", spec.name, spec.kind.as_str());
    if let Some(description) = &spec.description {
        text.push_str("\n\n");
        text.push_str(description);
    }

    if !spec.options.is_empty() {
        text.push_str("\n\n**Options:**");
        for option in &spec.options {
            text.push_str(&format!("\n- `{}`", option.key));
            if let Some(description) = &option.description {
                text.push_str(&format!(": {}", description));
            }
        }
    }
    text
}

fn option_markdown(spec: &OptionSpec, instruction: &str) -> String {
    let mut text = format!(
        "**{}** option of `{}` ({})",
        spec.key,
        instruction,
        spec.kind.as_str()
    );
    if let Some(operator) = spec.preferred_operator {
        text.push_str(&format!("\n\nPreferred operator: `{}`", operator));
    }
    if let Some(description) = &spec.description {
        text.push_str("\n\n");
        text.push_str(description);
    }
    text
}

/// Completion items for the text before `pos`.
///
/// After a `$` the schema's instructions are offered; on an otherwise empty
/// or partially typed line inside a group, that group's options.
pub fn completions_at(
    doc_state: &DocumentState,
    schema: &Schema,
    pos: Position,
) -> Vec<CompletionItem> {
    let Some(line) = doc_state.line(pos.line) else {
        return Vec::new();
    };
    let prefix = line[..byte_offset(line, pos.character)].trim_start();

    if let Some(partial) = prefix.strip_prefix('$') {
        if partial.contains(char::is_whitespace) {
            return Vec::new();
        }
        return schema
            .instructions()
            .iter()
            .filter(|spec| spec.name.starts_with(partial))
            .map(instruction_completion)
            .collect();
    }

    let is_partial_key = prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !is_partial_key {
        return Vec::new();
    }

    let Some(instruction) = doc_state.document.instruction_at_line(pos.line) else {
        return Vec::new();
    };
    if instruction.kind != InstructionKind::Group || instruction.range.line() == pos.line {
        return Vec::new();
    }
    let Some(spec) = schema.find_instruction(&instruction.base_name) else {
        return Vec::new();
    };

    spec.options
        .iter()
        .filter(|option| option.key.starts_with(prefix))
        .filter(|option| {
            // Single-valued options already present elsewhere are not offered again
            option.kind == OptionKind::List
                || !instruction
                    .options_with_key(&option.key)
                    .any(|existing| existing.range.line() != pos.line)
        })
        .map(option_completion)
        .collect()
}

fn instruction_completion(spec: &InstructionSpec) -> CompletionItem {
    let kind = match spec.kind {
        InstructionKind::Logical => CompletionItemKind::CONSTANT,
        InstructionKind::Group | InstructionKind::End => CompletionItemKind::KEYWORD,
    };

    CompletionItem {
        label: format!("${}", spec.name),
        kind: Some(kind),
        detail: Some(format!("{} instruction", spec.kind.as_str())),
        documentation: spec.description.clone().map(Documentation::String),
        filter_text: Some(format!("${}", spec.name)),
        insert_text: Some(spec.name.clone()),
        ..Default::default()
    }
}

fn option_completion(spec: &OptionSpec) -> CompletionItem {
    let operator = spec.preferred_operator.unwrap_or(OptionOperator::Colon);
    let insert_text = match operator {
        OptionOperator::Colon => format!("{}: ", spec.key),
        OptionOperator::Equals => format!("{}=", spec.key),
    };

    CompletionItem {
        label: spec.key.clone(),
        kind: Some(CompletionItemKind::PROPERTY),
        detail: Some(format!("{} option, {}", spec.kind.as_str(), operator)),
        documentation: spec.description.clone().map(Documentation::String),
        insert_text: Some(insert_text),
        ..Default::default()
    }
}

/// Outline: one symbol per instruction, options nested under it
pub fn document_symbols(doc_state: &DocumentState, schema: &Schema) -> Vec<DocumentSymbol> {
    doc_state
        .document
        .instructions
        .iter()
        .map(|instruction| {
            let last_line = instruction.last_line();
            let end_column = doc_state.line(last_line).map(utf16_len).unwrap_or(0);
            let range = Range::new(instruction.range.start, Position::new(last_line, end_column));

            let children: Vec<DocumentSymbol> = instruction
                .options
                .iter()
                .map(|option| {
                    symbol(
                        option.key.clone(),
                        Some(format!("{} {}", option.operator, option.value)),
                        SymbolKind::PROPERTY,
                        option.range,
                        option.key_range,
                        None,
                    )
                })
                .collect();

            let kind = match instruction.kind {
                InstructionKind::Logical => SymbolKind::CONSTANT,
                InstructionKind::Group | InstructionKind::End => SymbolKind::NAMESPACE,
            };
            let detail = schema
                .find_instruction(&instruction.base_name)
                .and_then(|spec| spec.description.clone());

            symbol(
                instruction.name.clone(),
                detail,
                kind,
                range,
                instruction.range,
                (!children.is_empty()).then_some(children),
            )
        })
        .collect()
}

fn symbol(
    name: String,
    detail: Option<String>,
    kind: SymbolKind,
    range: Range,
    selection_range: Range,
    children: Option<Vec<DocumentSymbol>>,
) -> DocumentSymbol {
    DocumentSymbol {
        name,
        detail,
        kind,
        tags: None,
        #[allow(deprecated)]
        deprecated: None,
        range: to_lsp_range(range),
        selection_range: to_lsp_range(selection_range),
        children,
    }
}

pub fn to_lsp_range(range: Range) -> lsp::Range {
    lsp::Range::new(
        lsp::Position::new(range.start.line, range.start.character),
        lsp::Position::new(range.end.line, range.end.character),
    )
}

pub fn to_lsp_diagnostic(diagnostic: &validation::Diagnostic) -> lsp::Diagnostic {
    let severity = match diagnostic.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Info => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    };

    lsp::Diagnostic::new(
        to_lsp_range(diagnostic.range),
        Some(severity),
        Some(NumberOrString::String(diagnostic.code().to_string())),
        Some(diagnostic.source().to_string()),
        diagnostic.message.clone(),
        None,
        None,
    )
}
