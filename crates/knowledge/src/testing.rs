//! Shared fixtures for unit tests: generated PDFs and a scripted LLM.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdfqa_core::{AppConfig, AppResult};
use pdfqa_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::path::Path;
use std::sync::Mutex;

/// Write a PDF with one page per entry, each holding the given text.
pub fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path).unwrap();
}

/// Prose of roughly `chars` characters built around `topic`.
pub fn long_page(topic: &str, chars: usize) -> String {
    let sentences = [
        "The {} was recorded in the harbor ledgers.",
        "Merchants argued about the {} for many seasons.",
        "Old maps place the {} near the outer ring canal.",
        "Nobody in the council could agree on the {} again.",
    ];
    let mut text = String::new();
    let mut i = 0;
    while text.len() < chars {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&sentences[i % sentences.len()].replace("{}", topic));
        i += 1;
    }
    text
}

/// Configuration rooted at `workspace` using the offline embedder.
pub fn test_config(workspace: &Path) -> AppConfig {
    let mut config = AppConfig {
        workspace: workspace.to_path_buf(),
        ..Default::default()
    };
    config.embedding.provider = "trigram".to_string();
    config.llm.model = "test-model".to_string();
    config
}

/// LLM double that records requests and echoes the system message back.
#[derive(Default)]
pub struct EchoLlm {
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl EchoLlm {
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LlmClient for EchoLlm {
    fn provider_name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(LlmResponse {
            content: format!("ECHO: {}", request.system.clone().unwrap_or_default()),
            model: request.model.clone(),
            usage: LlmUsage::new(42, 7),
        })
    }
}
