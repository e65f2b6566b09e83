use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::ImageFormat;

use sgp_watermark::payload::{PayloadRecord, FLAG_ALLOW_DERIVATIVE};
use sgp_watermark::{audit, create_master, generate_distribution, CodecContext, PixelBuffer, Verdict, WatermarkError};

const S1_KEY: &[u8] = b"test-key-32-bytes-................";

/// A smooth gradient rather than a flat fill, standing in for a "natural
/// photographic" fixture without bundling an external test-image corpus.
fn gradient_image(width: u32, height: u32) -> PixelBuffer {
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.max(1)) as u8;
            let g = (y * 255 / height.max(1)) as u8;
            let b = ((x + y) * 255 / (width + height).max(1)) as u8;
            rgb.push(r);
            rgb.push(g);
            rgb.push(b);
        }
    }
    PixelBuffer::new(width, height, rgb).unwrap()
}

/// Gradient plus a deterministic pseudo-random texture, closer to photo
/// noise than a pure gradient; used where JPEG quantization behavior on flat
/// regions would otherwise make the fixture unrealistically easy.
fn textured_image(width: u32, height: u32, seed: u32) -> PixelBuffer {
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
    for y in 0..height {
        for x in 0..width {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            let noise = (state >> 24) as u8;
            let r = ((x * 255 / width.max(1)) as u8).wrapping_add(noise >> 3);
            let g = ((y * 255 / height.max(1)) as u8).wrapping_add(noise >> 4);
            let b = (((x + y) * 255 / (width + height).max(1)) as u8).wrapping_add(noise >> 5);
            rgb.push(r);
            rgb.push(g);
            rgb.push(b);
        }
    }
    PixelBuffer::new(width, height, rgb).unwrap()
}

fn jpeg_round_trip(image: &PixelBuffer, quality: u8) -> PixelBuffer {
    let rgb_image = image.to_rgb_image();
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut Cursor::new(&mut bytes), quality);
    encoder.encode_image(&rgb_image).unwrap();

    let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
    PixelBuffer::from_rgb_image(&decoded.to_rgb8())
}

fn resize_to_width(image: &PixelBuffer, width: u32) -> PixelBuffer {
    let height = ((image.height() as u64 * width as u64) / image.width().max(1) as u64).max(1) as u32;
    let resized = imageops::resize(&image.to_rgb_image(), width, height, FilterType::Lanczos3);
    PixelBuffer::from_rgb_image(&resized)
}

fn psnr(a: &PixelBuffer, b: &PixelBuffer) -> f64 {
    assert_eq!(a.rgb().len(), b.rgb().len());
    let mse: f64 = a
        .rgb()
        .iter()
        .zip(b.rgb().iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        / a.rgb().len() as f64;
    if mse == 0.0 {
        return f64::INFINITY;
    }
    10.0 * (255.0 * 255.0 / mse).log10()
}

#[test]
fn s1_create_master() {
    let ctx = CodecContext::with_default_step(S1_KEY.to_vec());
    let image = gradient_image(1024, 1024);

    let master = create_master(&ctx, &image, 12345, FLAG_ALLOW_DERIVATIVE).unwrap();
    let record = audit(&ctx, &master);

    assert_eq!(record.verdict, Verdict::Watermarked);
    assert_eq!(record.original_uid, Some(12345));
    assert_eq!(record.current_uid, Some(0));
    assert!(record.allow_derivative);
    assert!(!record.allow_reprint);
    assert!(record.confidence >= 0.95);
}

#[test]
fn s2_distribute() {
    let ctx = CodecContext::with_default_step(S1_KEY.to_vec());
    let image = gradient_image(1024, 1024);
    let master = create_master(&ctx, &image, 12345, FLAG_ALLOW_DERIVATIVE).unwrap();

    let recipient: u128 = 987654321098765432109876;
    let distributed = generate_distribution(&ctx, &master, recipient).unwrap();
    let record = audit(&ctx, &distributed);

    assert_eq!(record.original_uid, Some(12345));
    assert_eq!(record.current_uid, Some(recipient));
    assert!(record.allow_derivative);
    assert!(!record.allow_reprint);
}

#[test]
fn s3_fork_allowed() {
    let ctx = CodecContext::with_default_step(S1_KEY.to_vec());
    let image = gradient_image(1024, 1024);
    let master = create_master(&ctx, &image, 12345, FLAG_ALLOW_DERIVATIVE).unwrap();

    let forked = create_master(&ctx, &master, 77777, FLAG_ALLOW_DERIVATIVE).unwrap();
    let record = audit(&ctx, &forked);

    assert_eq!(record.original_uid, Some(77777));
    assert_eq!(record.current_uid, Some(0));
    assert!(record.allow_derivative);
}

#[test]
fn s4_fork_denied() {
    let ctx = CodecContext::with_default_step(S1_KEY.to_vec());
    let image = gradient_image(1024, 1024);
    let master = create_master(&ctx, &image, 12345, 0).unwrap();

    let err = create_master(&ctx, &master, 77777, 0).unwrap_err();
    assert!(matches!(err, WatermarkError::DerivativeForbidden { actor_uid: 77777 }));
}

#[test]
fn s5_jpeg_survival() {
    let ctx = CodecContext::with_default_step(S1_KEY.to_vec());
    let image = gradient_image(1024, 1024);
    let master = create_master(&ctx, &image, 12345, FLAG_ALLOW_DERIVATIVE).unwrap();

    let recipient: u128 = 987654321098765432109876;
    let distributed = generate_distribution(&ctx, &master, recipient).unwrap();

    let reencoded = jpeg_round_trip(&distributed, 70);
    let record = audit(&ctx, &reencoded);

    assert_eq!(record.verdict, Verdict::Watermarked);
    assert_eq!(record.original_uid, Some(12345));
    assert_eq!(record.current_uid, Some(recipient));
    assert!(record.confidence >= 0.8, "confidence {} below threshold", record.confidence);
}

#[test]
fn s6_downscale_then_audit() {
    let ctx = CodecContext::with_default_step(S1_KEY.to_vec());
    let image = gradient_image(1024, 1024);
    let master = create_master(&ctx, &image, 12345, FLAG_ALLOW_DERIVATIVE).unwrap();

    let downscaled = resize_to_width(&master, 768);
    let record = audit(&ctx, &downscaled);

    assert_eq!(record.original_uid, Some(12345));
    assert_eq!(record.scale_used, 768);
}

#[test]
fn audit_record_round_trips_through_json() {
    let ctx = CodecContext::with_default_step(S1_KEY.to_vec());
    let image = gradient_image(1024, 1024);
    let master = create_master(&ctx, &image, 12345, FLAG_ALLOW_DERIVATIVE).unwrap();
    let record = audit(&ctx, &master);

    let bytes = serde_json::to_vec(&record).unwrap();
    let back: sgp_watermark::AuditRecord = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(back, record);
}

#[test]
fn property_5_visibility_bound() {
    let ctx = CodecContext::with_default_step(b"psnr-key-0123456789".to_vec());
    let payload = PayloadRecord::new(1, 0, FLAG_ALLOW_DERIVATIVE).unwrap();

    for seed in 0..3u32 {
        let image = textured_image(1024, 1024, seed);
        let watermarked = sgp_watermark::orchestration::embed_payload(&ctx, &image, &payload).unwrap();
        let value = psnr(&image, &watermarked);
        assert!(value > 36.0, "seed {seed}: psnr {value} <= 36 dB");
    }
}

#[test]
fn property_6_jpeg_robustness_success_rate() {
    let ctx = CodecContext::with_default_step(b"jpeg-robustness-key!".to_vec());
    let payload = PayloadRecord::new(42, 0, FLAG_ALLOW_DERIVATIVE).unwrap();

    let mut successes = 0;
    let trials = 8;
    for seed in 0..trials {
        let image = textured_image(1024, 1024, seed);
        let watermarked = sgp_watermark::orchestration::embed_payload(&ctx, &image, &payload).unwrap();
        let reencoded = jpeg_round_trip(&watermarked, 70);
        let outcome = sgp_watermark::orchestration::extract_payload(&ctx, &reencoded).unwrap();
        if outcome.payload == Ok(payload) {
            successes += 1;
        }
    }

    let rate = successes as f64 / trials as f64;
    assert!(rate >= 0.95, "jpeg robustness success rate {rate} below 0.95 ({successes}/{trials})");
}

#[test]
fn property_7_scale_robustness_across_candidate_widths() {
    let ctx = CodecContext::with_default_step(b"scale-robustness-key".to_vec());
    let image = gradient_image(1280, 1280);
    let master = create_master(&ctx, &image, 555, FLAG_ALLOW_DERIVATIVE).unwrap();

    for &width in &[512u32, 768, 1024, 2048] {
        let resized = resize_to_width(&master, width);
        let record = audit(&ctx, &resized);
        assert_eq!(record.verdict, Verdict::Watermarked, "failed to recover at width {width}");
        assert_eq!(record.original_uid, Some(555));
    }
}
