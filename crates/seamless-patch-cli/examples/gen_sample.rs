//! Generates a sample original and, given a prepared session, fakes the external edit.
//!
//! cargo run -p seamless-patch-cli --example gen_sample -- data portrait
//! cargo run -p seamless-patch-cli --example gen_sample -- data portrait sky_birds
use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use seamless_patch_core::{WorkspaceLayout, load_rgba, save_png};
use std::path::PathBuf;

fn sky(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |_, y| {
        let t = y as f32 / h.max(1) as f32;
        Rgba([
            (90.0 + 100.0 * t) as u8,
            (150.0 + 60.0 * t) as u8,
            (235.0 - 40.0 * t) as u8,
            255,
        ])
    })
}

fn draw_ellipse(img: &mut RgbaImage, cx: i32, cy: i32, rx: f32, ry: f32, c: [u8; 4]) {
    let (w, h) = img.dimensions();
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let dx = (x - cx) as f32;
            let dy = (y - cy) as f32;
            if (dx * dx) / (rx * rx) + (dy * dy) / (ry * ry) <= 1.0 {
                img.put_pixel(x as u32, y as u32, Rgba(c));
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let base = PathBuf::from(args.first().map(String::as_str).unwrap_or("data"));
    let image = args.get(1).map(String::as_str).unwrap_or("portrait");
    let layout = WorkspaceLayout::rooted_at(&base);
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);

    match args.get(2) {
        None => {
            let mut img = sky(500, 500);
            draw_ellipse(&mut img, 380, 110, 45.0, 45.0, [255, 220, 90, 255]);
            for _ in 0..6 {
                let cx = rng.gen_range(0..500);
                let cy = rng.gen_range(150..300);
                let rx = rng.gen_range(30.0..80.0);
                draw_ellipse(&mut img, cx, cy, rx, rx * 0.4, [245, 245, 250, 255]);
            }
            draw_ellipse(&mut img, 250, 520, 400.0, 140.0, [70, 130, 60, 255]);
            let out = layout.original_image(image);
            save_png(&img, &out)?;
            println!("wrote {}", out.display());
        }
        Some(session) => {
            // Stand-in for the external editor: a few "birds" and a returned size that
            // differs from the crop, so the blend has to resample.
            let mut patch = load_rgba(&layout.patch_path(image, session))?;
            let (w, h) = patch.dimensions();
            for _ in 0..12 {
                let cx = rng.gen_range(0..w as i32);
                let cy = rng.gen_range(0..(h as i32 / 2).max(1));
                draw_ellipse(&mut patch, cx, cy, 6.0, 2.0, [30, 30, 35, 255]);
            }
            let resized = image::imageops::resize(
                &patch,
                (w * 2).max(1),
                (h * 2).max(1),
                image::imageops::FilterType::Triangle,
            );
            let out = layout.edited_patch_path(image, session);
            save_png(&resized, &out)?;
            println!("wrote {}", out.display());
        }
    }
    Ok(())
}
