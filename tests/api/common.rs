// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared fixtures for the HTTP tests: stub collaborators, DICOM and raster
//! builders, multipart requests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, Method, Request, Response},
    Router,
};
use dental_xray_api::{
    api::{create_app, AppState},
    config::ServiceConfig,
    detection::{DetectionError, Detector, FindingSet},
    report::{GenerationError, ReportComposer, TextGenerator},
};
use dicom_core::{dicom_value, DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::tags;
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use serde_json::Value;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const BOUNDARY: &str = "----xray-test-boundary-7d91";

const SECONDARY_CAPTURE: &str = "1.2.840.10008.5.1.4.1.1.7";
const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";
const INSTANCE_UID: &str = "2.25.123456789";

type DetectReply = Box<dyn Fn() -> Result<FindingSet, DetectionError> + Send + Sync>;
type GenerateReply = Box<dyn Fn() -> Result<String, GenerationError> + Send + Sync>;

/// Detector double that records every payload it is given
pub struct StubDetector {
    calls: AtomicUsize,
    payloads: Mutex<Vec<String>>,
    reply: DetectReply,
}

impl StubDetector {
    pub fn returning(raw: Value) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
            reply: Box::new(move || Ok(FindingSet::from_raw(raw.clone()).unwrap())),
        })
    }

    pub fn failing(make: impl Fn() -> DetectionError + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
            reply: Box::new(move || Err(make())),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<String> {
        self.payloads.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Detector for StubDetector {
    async fn detect(&self, image_base64: &str) -> Result<FindingSet, DetectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(image_base64.to_string());
        (self.reply)()
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Text generator double that records prompts
pub struct StubGenerator {
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    reply: GenerateReply,
}

impl StubGenerator {
    pub fn returning(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            reply: Box::new(move || Ok(text.clone())),
        })
    }

    pub fn failing(make: impl Fn() -> GenerationError + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            reply: Box::new(move || Err(make())),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.reply)()
    }
}

pub fn test_config(scratch_dir: Option<&Path>) -> ServiceConfig {
    let mut config = ServiceConfig::new_for_test();
    config.scratch_dir = scratch_dir.map(Path::to_path_buf);
    config
}

pub fn build_app(
    config: ServiceConfig,
    detector: Arc<dyn Detector>,
    generator: Option<Arc<StubGenerator>>,
) -> Router {
    let generator = generator.map(|g| g as Arc<dyn TextGenerator>);
    let composer = ReportComposer::new(generator, config.fallback_width);
    create_app(Arc::new(AppState::new(config, detector, composer)))
}

fn base_dicom_object(rows: u16, columns: u16) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(SECONDARY_CAPTURE),
    ));
    obj.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(INSTANCE_UID),
    ));
    obj.put(DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::from("IO")));
    obj.put(DataElement::new(
        tags::SAMPLES_PER_PIXEL,
        VR::US,
        dicom_value!(U16, [1]),
    ));
    obj.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from("MONOCHROME2"),
    ));
    obj.put(DataElement::new(tags::ROWS, VR::US, dicom_value!(U16, [rows])));
    obj.put(DataElement::new(
        tags::COLUMNS,
        VR::US,
        dicom_value!(U16, [columns]),
    ));
    obj.put(DataElement::new(
        tags::BITS_ALLOCATED,
        VR::US,
        dicom_value!(U16, [16]),
    ));
    obj.put(DataElement::new(tags::BITS_STORED, VR::US, dicom_value!(U16, [16])));
    obj.put(DataElement::new(tags::HIGH_BIT, VR::US, dicom_value!(U16, [15])));
    obj.put(DataElement::new(
        tags::PIXEL_REPRESENTATION,
        VR::US,
        dicom_value!(U16, [0]),
    ));
    obj
}

fn write_dicom_file(obj: InMemDicomObject) -> Vec<u8> {
    let file_obj = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(EXPLICIT_VR_LE)
                .media_storage_sop_class_uid(SECONDARY_CAPTURE)
                .media_storage_sop_instance_uid(INSTANCE_UID),
        )
        .unwrap();

    let mut bytes = Vec::new();
    file_obj.write_all(&mut bytes).unwrap();
    bytes
}

/// A 16-bit MONOCHROME2 DICOM file, preamble included
pub fn dicom_fixture(rows: u16, columns: u16, pixels: &[u16]) -> Vec<u8> {
    assert_eq!(pixels.len(), rows as usize * columns as usize);
    let mut obj = base_dicom_object(rows, columns);
    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::U16(pixels.into()),
    ));
    write_dicom_file(obj)
}

/// 4x3 gradient across the full 16-bit range
pub fn gradient_dicom() -> Vec<u8> {
    let pixels: Vec<u16> = (0..12u32).map(|i| (i * 65535 / 11) as u16).collect();
    dicom_fixture(4, 3, &pixels)
}

/// Valid DICOM header with no pixel data element
pub fn dicom_without_pixels() -> Vec<u8> {
    write_dicom_file(base_dicom_object(2, 2))
}

pub fn png_fixture() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(3, 2, image::Rgb([200, 10, 10]));
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

fn multipart_body(filename: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
        BOUNDARY, filename, content_type
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_post(uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(body)
        .unwrap()
}

pub fn multipart_request(uri: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    multipart_post(uri, Body::from(multipart_body(filename, content_type, bytes)))
}

/// Same body as [`multipart_request`], delivered in `chunk_size` frames
pub fn chunked_multipart_request(
    uri: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
    chunk_size: usize,
) -> Request<Body> {
    let chunks: Vec<Result<Bytes, std::io::Error>> = multipart_body(filename, content_type, bytes)
        .chunks(chunk_size)
        .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
        .collect();

    multipart_post(uri, Body::from_stream(futures_util::stream::iter(chunks)))
}

/// Multipart body whose only field is not `file`
pub fn multipart_without_file(uri: &str) -> Request<Body> {
    let body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{}--\r\n",
        BOUNDARY, BOUNDARY
    );

    multipart_post(uri, Body::from(body))
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn decode_data_uri(uri: &str, mime: &str) -> Vec<u8> {
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    let prefix = format!("data:{};base64,", mime);
    let payload = uri
        .strip_prefix(&prefix)
        .unwrap_or_else(|| panic!("expected {} data URI, got {:.40}", mime, uri));
    STANDARD.decode(payload).unwrap()
}

pub fn scratch_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
