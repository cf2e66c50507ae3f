// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Tests for POST /convert

use axum::http::StatusCode;
use dental_xray_api::vision::{ImageEncoding, DEGENERATE_GRAY};
use serde_json::json;
use tower::util::ServiceExt;

use super::common::*;

#[tokio::test]
async fn test_convert_returns_jpeg_data_uri() {
    let detector = StubDetector::returning(json!({}));
    let app = build_app(test_config(None), detector.clone(), None);

    let request = multipart_request("/convert", "scan.dcm", "application/dicom", &gradient_dicom());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let jpeg = decode_data_uri(body["imageBase64"].as_str().unwrap(), "image/jpeg");

    let decoded = image::load_from_memory(&jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (3, 4));
    // conversion never calls the detector
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_convert_accepts_stream_without_preamble() {
    let app = build_app(test_config(None), StubDetector::returning(json!({})), None);
    let bytes = gradient_dicom();

    let request = multipart_request("/convert", "scan.dcm", "application/dicom", &bytes[128..]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_convert_png_rescales_full_range() {
    let mut config = test_config(None);
    config.image_encoding = ImageEncoding::Png;
    let app = build_app(config, StubDetector::returning(json!({})), None);

    let pixels = [100u16, 4095, 2000, 100];
    let request = multipart_request(
        "/convert",
        "scan.dcm",
        "application/octet-stream",
        &dicom_fixture(2, 2, &pixels),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let png = decode_data_uri(body["imageBase64"].as_str().unwrap(), "image/png");
    let rgb = image::load_from_memory(&png).unwrap().to_rgb8();

    let gray: Vec<u8> = rgb.pixels().map(|p| p.0[0]).collect();
    assert_eq!(gray[0], 0);
    assert_eq!(gray[1], 255);
    assert!(gray[2] > gray[0] && gray[2] < gray[1]);
    assert!(rgb.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
}

#[tokio::test]
async fn test_convert_flat_image_is_mid_gray() {
    let mut config = test_config(None);
    config.image_encoding = ImageEncoding::Png;
    let app = build_app(config, StubDetector::returning(json!({})), None);

    let request = multipart_request(
        "/convert",
        "flat.dcm",
        "application/dicom",
        &dicom_fixture(2, 3, &[777; 6]),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let png = decode_data_uri(body["imageBase64"].as_str().unwrap(), "image/png");
    let rgb = image::load_from_memory(&png).unwrap().to_rgb8();
    assert!(rgb.pixels().all(|p| p.0 == [DEGENERATE_GRAY; 3]));
}

#[tokio::test]
async fn test_convert_rejects_non_dicom() {
    let app = build_app(test_config(None), StubDetector::returning(json!({})), None);

    let request = multipart_request("/convert", "scan.dcm", "application/dicom", b"not dicom at all");
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error_type"], "decode_error");
    assert!(body["request_id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_convert_missing_pixel_data() {
    let app = build_app(test_config(None), StubDetector::returning(json!({})), None);

    let request = multipart_request("/convert", "empty.dcm", "application/dicom", &dicom_without_pixels());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error_type"], "pixel_data_error");
}

#[tokio::test]
async fn test_convert_missing_file_field() {
    let app = build_app(test_config(None), StubDetector::returning(json!({})), None);

    let response = app.oneshot(multipart_without_file("/convert")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error_type"], "validation_error");
}

#[tokio::test]
async fn test_convert_leaves_scratch_dir_empty() {
    let scratch = tempfile::tempdir().unwrap();
    let app = build_app(
        test_config(Some(scratch.path())),
        StubDetector::returning(json!({})),
        None,
    );

    let request = multipart_request("/convert", "scan.dcm", "application/dicom", &gradient_dicom());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(scratch_entries(scratch.path()), 0);
}

#[tokio::test]
async fn test_convert_decodes_in_memory_without_scratch_dir() {
    let scratch = tempfile::tempdir().unwrap();
    let missing = scratch.path().join("does-not-exist");
    let detector = StubDetector::returning(json!({"predictions": []}));
    let app = build_app(test_config(Some(&missing)), detector.clone(), None);

    let convert = app
        .clone()
        .oneshot(multipart_request("/convert", "scan.dcm", "application/dicom", &gradient_dicom()))
        .await
        .unwrap();
    assert_eq!(convert.status(), StatusCode::OK);

    // the analysis path still goes through a temp file in the scratch dir
    let analyze = app
        .oneshot(multipart_request(
            "/upload-and-analyze",
            "scan.dcm",
            "application/dicom",
            &gradient_dicom(),
        ))
        .await
        .unwrap();
    assert_eq!(analyze.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(analyze).await["error_type"], "internal_error");
    assert_eq!(detector.calls(), 0);
    assert!(!missing.exists());
}
