use crate::foundation::{
    core::Rgba8,
    error::{StatwheelError, StatwheelResult},
};

/// One premultiplied RGBA8 pixel.
pub type PremulPixel = [u8; 4];

/// Premultiplied source-over of a single pixel.
pub fn over(dst: PremulPixel, src: PremulPixel) -> PremulPixel {
    match src[3] {
        0 => dst,
        255 => src,
        sa => {
            let keep = 255 - u16::from(sa);
            std::array::from_fn(|i| src[i].saturating_add(mul_div255(u16::from(dst[i]), keep)))
        }
    }
}

/// Source-over of a whole layer onto `dst`. Both are premultiplied RGBA8 of equal size.
pub fn over_in_place(dst: &mut [u8], layer: &[u8]) -> StatwheelResult<()> {
    if dst.len() != layer.len() || !dst.len().is_multiple_of(4) {
        return Err(StatwheelError::render(format!(
            "layer of {} bytes cannot be composited onto {} bytes",
            layer.len(),
            dst.len()
        )));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(layer.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Overwrite `dst` with a diagonal gradient running from the top-left to the bottom-right corner.
pub fn fill_linear_gradient(
    dst: &mut [u8],
    width: u32,
    height: u32,
    from: Rgba8,
    to: Rgba8,
) -> StatwheelResult<()> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| StatwheelError::render("gradient buffer size overflow"))?;
    if dst.len() != expected_len {
        return Err(StatwheelError::render(
            "fill_linear_gradient expects a buffer matching width*height*4",
        ));
    }

    // Project each pixel center onto the (0,0)->(w,h) axis.
    let (w, h) = (f64::from(width), f64::from(height));
    let len2 = w * w + h * h;
    let lerp = |a: u8, b: u8, t: f64| -> u8 {
        (f64::from(a) + (f64::from(b) - f64::from(a)) * t)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    for y in 0..height {
        for x in 0..width {
            let px = f64::from(x) + 0.5;
            let py = f64::from(y) + 0.5;
            let t = ((px * w + py * h) / len2).clamp(0.0, 1.0);
            let c = Rgba8::rgba(
                lerp(from.r, to.r, t),
                lerp(from.g, to.g, t),
                lerp(from.b, to.b, t),
                lerp(from.a, to.a, t),
            )
            .premultiplied();
            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            dst[idx..idx + 4].copy_from_slice(&c.to_array());
        }
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_source_keeps_destination() {
        assert_eq!(over([10, 20, 30, 40], [255, 255, 255, 0]), [10, 20, 30, 40]);
    }

    #[test]
    fn opaque_source_replaces_destination() {
        assert_eq!(over([0, 0, 255, 255], [255, 0, 0, 255]), [255, 0, 0, 255]);
    }

    #[test]
    fn translucent_source_blends() {
        // 50% red over opaque blue
        assert_eq!(over([0, 0, 255, 255], [128, 0, 0, 128]), [128, 0, 127, 255]);
        assert_eq!(over([0, 0, 0, 0], [100, 110, 120, 200]), [100, 110, 120, 200]);
    }

    #[test]
    fn layer_sizes_must_match() {
        let mut dst = vec![0u8; 8];
        assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
        assert!(over_in_place(&mut dst, &[255u8; 8]).is_ok());
        assert_eq!(dst, vec![255u8; 8]);
    }

    #[test]
    fn gradient_runs_corner_to_corner() {
        let (w, h) = (64u32, 32u32);
        let from = Rgba8::rgb(0, 0, 0);
        let to = Rgba8::rgb(200, 100, 50);
        let mut buf = vec![0u8; (w * h * 4) as usize];
        fill_linear_gradient(&mut buf, w, h, from, to).unwrap();

        let first = &buf[0..4];
        let last = &buf[buf.len() - 4..];
        assert!(first[0] < 5 && first[3] == 255);
        assert!(last[0] > 195 && last[1] > 95 && last[3] == 255);

        // monotone along the main diagonal
        let mut prev = 0u8;
        for i in 0..h {
            let x = i * 2;
            let idx = ((i * w + x) * 4) as usize;
            assert!(buf[idx] >= prev);
            prev = buf[idx];
        }
    }
}
