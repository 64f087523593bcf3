//! WASM bindings for NFSe to ABRASF XML conversion.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! Text extraction from the PDF happens on the JavaScript side; these
//! functions take the extracted text.

use std::sync::Arc;

use wasm_bindgen::prelude::*;

use nfse_core::invoice::rules::{format_amount, parse_brl_amount};
use nfse_core::invoice::{InvoiceParser, NfseParser};
use nfse_core::models::invoice::IssuerProfile;
use nfse_core::xml::{serialize, serialize_batch, WriteOptions, XmlWriter};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parse and validate an issuer profile given as JSON, or use the default.
fn issuer_from_json(issuer_json: Option<String>) -> Result<Arc<IssuerProfile>, JsValue> {
    let issuer = match issuer_json {
        Some(json) => serde_json::from_str::<IssuerProfile>(&json).map_err(js_err)?,
        None => IssuerProfile::default(),
    };
    issuer.validate().map_err(js_err)?;
    Ok(issuer.shared())
}

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Convert NFSe text into an ABRASF `ListaNfse` XML string.
///
/// `issuer_json` is an optional issuer profile in the configuration's JSON
/// shape. Every field except `complement` must be given; without a profile
/// the built-in default issuer is used.
#[wasm_bindgen]
pub fn convert_text_to_xml(text: &str, issuer_json: Option<String>) -> Result<String, JsValue> {
    NfseConverter::new(issuer_json)?.convert(text)
}

/// Extract the invoice record from text as a plain JS object.
#[wasm_bindgen]
pub fn extract_invoice_from_text(
    text: &str,
    issuer_json: Option<String>,
) -> Result<JsValue, JsValue> {
    NfseConverter::new(issuer_json)?.extract(text)
}

/// Parse a Brazilian-formatted amount (e.g., "1.234,56") into "1234.56".
#[wasm_bindgen]
pub fn parse_amount(amount: &str) -> Option<String> {
    parse_brl_amount(amount).map(format_amount)
}

/// Converter bound to one issuer profile, for repeated use from JS.
#[wasm_bindgen]
pub struct NfseConverter {
    parser: NfseParser,
    writer: XmlWriter,
}

#[wasm_bindgen]
impl NfseConverter {
    #[wasm_bindgen(constructor)]
    pub fn new(issuer_json: Option<String>) -> Result<NfseConverter, JsValue> {
        Ok(Self {
            parser: NfseParser::new(issuer_from_json(issuer_json)?),
            writer: XmlWriter::default(),
        })
    }

    /// Write XML on a single line instead of indented.
    #[wasm_bindgen]
    pub fn set_compact(&mut self, compact: bool) {
        let options = if compact {
            WriteOptions::compact()
        } else {
            WriteOptions::default()
        };
        self.writer = XmlWriter::new(options);
    }

    /// Convert one document's text to XML.
    #[wasm_bindgen]
    pub fn convert(&self, text: &str) -> Result<String, JsValue> {
        let record = self.parser.parse(text);
        self.writer.to_string(&serialize(&record)).map_err(js_err)
    }

    /// Convert several documents into one consolidated `ListaNfse`.
    #[wasm_bindgen]
    pub fn convert_batch(&self, texts: Vec<String>) -> Result<String, JsValue> {
        let records: Vec<_> = texts.iter().map(|text| self.parser.parse(text)).collect();
        self.writer
            .to_string(&serialize_batch(&records))
            .map_err(js_err)
    }

    /// Extract the invoice record, including which fields were not found.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        let record = self.parser.parse(text);
        serde_wasm_bindgen::to_value(&record).map_err(js_err)
    }
}
