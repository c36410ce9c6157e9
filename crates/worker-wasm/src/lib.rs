//! WASM-compatible wrapper for rendering image tags.
//!
//! This crate exposes the image module to JavaScript for use in browsers and
//! Cloudflare Workers. There is no filesystem there, so every tag value must
//! be a data URL or a byte array.

use docx_image_core::{ImageLoader, ImageOptions, ImageSize, SizePolicy};
use docx_image_ooxml::{ImageModule, Package};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of rendering a template.
#[derive(Debug, Serialize, Deserialize)]
pub struct RenderResult {
    /// Detected format of the template.
    pub format: String,
    /// Number of pictures inserted.
    pub images_inserted: usize,
    /// Number of tags dropped for lack of a value.
    pub tags_removed: usize,
}

/// Render the image tags of a template.
///
/// # Arguments
/// * `template` - The raw bytes of the DOCX or PPTX file
/// * `data` - An object mapping tag names to data URLs or byte arrays
/// * `centered` - Center images whose tag is alone in its paragraph or shape
/// * `width` / `height` - Fixed size in pixels; both omitted means the
///   images' own dimensions
///
/// # Returns
/// The rendered package bytes, or throws on error.
#[wasm_bindgen]
pub fn render_template(
    template: &[u8],
    data: JsValue,
    centered: bool,
    width: Option<f64>,
    height: Option<f64>,
) -> Result<js_sys::Uint8Array, JsValue> {
    let data: Map<String, Value> = serde_wasm_bindgen::from_value(data)
        .map_err(|e| JsValue::from_str(&format!("Invalid data object: {}", e)))?;

    let (bytes, _) = render_template_impl(template, &data, centered, width.zip(height))
        .map_err(|e| JsValue::from_str(&e))?;

    Ok(js_sys::Uint8Array::from(bytes.as_slice()))
}

/// Inspect what rendering a template would do, without returning the bytes.
#[wasm_bindgen]
pub fn render_summary(template: &[u8], data: JsValue, centered: bool) -> Result<JsValue, JsValue> {
    let data: Map<String, Value> = serde_wasm_bindgen::from_value(data)
        .map_err(|e| JsValue::from_str(&format!("Invalid data object: {}", e)))?;

    let (_, result) = render_template_impl(template, &data, centered, None).map_err(|e| JsValue::from_str(&e))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn render_template_impl(
    template: &[u8],
    data: &Map<String, Value>,
    centered: bool,
    size: Option<(f64, f64)>,
) -> Result<(Vec<u8>, RenderResult), String> {
    let policy = match size {
        Some((width, height)) => {
            SizePolicy::Fixed(ImageSize::new(width, height).map_err(|e| e.to_string())?)
        }
        None => SizePolicy::Detect,
    };

    let module = ImageModule::new(ImageLoader::new().with_size_policy(policy))
        .with_options(ImageOptions::new().with_centered(centered));

    let mut package = Package::from_bytes(template).map_err(|e| format!("Template error: {}", e))?;
    let stats = module
        .render(&mut package, data)
        .map_err(|e| format!("Render error: {}", e))?;
    let bytes = package.to_bytes().map_err(|e| format!("Write error: {}", e))?;

    Ok((
        bytes,
        RenderResult {
            format: package.format().extension().to_string(),
            images_inserted: stats.images_inserted,
            tags_removed: stats.tags_removed,
        },
    ))
}
