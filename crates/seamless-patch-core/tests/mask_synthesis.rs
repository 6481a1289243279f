use image::{GrayImage, Luma};
use seamless_patch_core::prelude::*;
use seamless_patch_core::{gaussian_blur_gray, save_mask_png};

fn all_equal(mask: &GrayImage, v: u8) -> bool {
    mask.pixels().all(|p| p[0] == v)
}

#[test]
fn zero_padding_is_uniformly_opaque_for_any_blur() {
    for blur in [0, 1, 4, 25] {
        let m = create_soft_mask(37, 21, 0, blur, FalloffMode::Literal).unwrap();
        assert_eq!(m.dimensions(), (37, 21));
        assert!(all_equal(&m, 255), "blur {blur}");
    }
}

// Known property of the literal edge-distance rule: it collapses to zero outside the
// interior, so the buffer zone is opaque before blurring.
#[test]
fn literal_falloff_without_interior_is_uniformly_opaque_before_blur() {
    for (w, h, p) in [(10, 10, 5), (10, 30, 6), (7, 7, 20), (1, 1, 1)] {
        let m = create_soft_mask(w, h, p, 0, FalloffMode::Literal).unwrap();
        assert!(all_equal(&m, 255), "{w}x{h} padding {p}");
    }
}

#[test]
fn literal_falloff_with_interior_is_uniformly_opaque_before_blur() {
    let m = create_soft_mask(140, 140, 20, 0, FalloffMode::Literal).unwrap();
    assert!(all_equal(&m, 255));
}

#[test]
fn blurring_a_constant_mask_keeps_it_constant() {
    let m = create_soft_mask(90, 60, 12, 12, FalloffMode::Literal).unwrap();
    assert!(all_equal(&m, 255));
}

#[test]
fn linear_falloff_fades_to_zero_at_the_outer_edge() {
    let m = create_soft_mask(20, 20, 5, 0, FalloffMode::Linear).unwrap();
    assert_eq!(m.get_pixel(0, 0)[0], 0);
    assert_eq!(m.get_pixel(19, 19)[0], 0);
    assert_eq!(m.get_pixel(5, 5)[0], 255);
    assert_eq!(m.get_pixel(10, 10)[0], 255);
    // three pixels from the left interior edge: 255 * (1 - 3/5)
    assert_eq!(m.get_pixel(2, 10)[0], 102);
    // monotone towards the interior
    for x in 0..5 {
        assert!(m.get_pixel(x, 10)[0] < m.get_pixel(x + 1, 10)[0]);
    }
}

#[test]
fn linear_falloff_blur_softens_but_keeps_center_opaque() {
    let m = create_soft_mask(120, 100, 20, 4, FalloffMode::Linear).unwrap();
    assert_eq!(m.get_pixel(60, 50)[0], 255);
    assert!(m.get_pixel(0, 0)[0] < 40);
    assert!(m.get_pixel(0, 50)[0] < m.get_pixel(10, 50)[0]);
}

#[test]
fn zero_dimensions_are_a_value_error() {
    let err = create_soft_mask(0, 10, 2, 2, FalloffMode::Literal).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
    let err = create_soft_mask(10, 0, 2, 2, FalloffMode::Linear).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);
}

#[test]
fn blur_uses_edge_extension() {
    // a bright left column bleeds right, but the border itself is not darkened by
    // phantom zero samples beyond the edge
    let mut img = GrayImage::new(9, 9);
    for y in 0..9 {
        img.put_pixel(0, y, Luma([255]));
    }
    let out = gaussian_blur_gray(&img, 1.0);
    assert!(out.get_pixel(0, 0)[0] > 128);
    assert!(out.get_pixel(0, 4)[0] > 128);
    assert!(out.get_pixel(1, 4)[0] > 0);
    assert_eq!(out.get_pixel(8, 4)[0], 0);
}

#[test]
fn saved_mask_is_single_channel_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("masks").join("m.png");
    let mask = create_soft_mask(40, 30, 6, 2, FalloffMode::Linear).unwrap();
    save_mask_png(&mask, &path).expect("save");

    let back = image::open(&path).expect("reopen");
    assert_eq!(back.color(), image::ColorType::L8);
    assert_eq!(back.to_luma8(), mask);
}
