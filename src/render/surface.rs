use std::sync::Arc;

use crate::{
    assets::portrait::Portrait,
    foundation::{
        core::{Affine, BezPath, Canvas, Rect, Rgba8},
        error::{StatwheelError, StatwheelResult},
    },
    render::composite,
};

/// Owned premultiplied RGBA8 raster.
///
/// Drawing goes through [`Surface::paint`]: each call rasterizes into a fresh transparent layer
/// and composites it source-over, so a surface is only ever touched by the caller holding `&mut`.
pub struct Surface {
    canvas: Canvas,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.canvas.width)
            .field("height", &self.canvas.height)
            .finish_non_exhaustive()
    }
}

impl Surface {
    pub fn new(canvas: Canvas) -> StatwheelResult<Self> {
        let (w, h) = canvas_u16(canvas)?;
        Ok(Self {
            canvas,
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    pub fn with_size(width: u32, height: u32) -> StatwheelResult<Self> {
        Self::new(Canvas::new(width, height)?)
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// Premultiplied RGBA8, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    /// Premultiplied pixel at `(x, y)`; `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let idx = ((y as usize) * (self.canvas.width as usize) + (x as usize)) * 4;
        let d = self.data();
        Some([d[idx], d[idx + 1], d[idx + 2], d[idx + 3]])
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.fill(Rgba8::rgba(0, 0, 0, 0));
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Rgba8) {
        let premul = color.premultiplied().to_array();
        for px in self.data_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&premul);
        }
    }

    /// Rasterize one layer of draw calls and composite it over the current contents.
    pub fn paint(&mut self, draw: impl FnOnce(&mut Painter<'_>)) -> StatwheelResult<()> {
        let (w, h) = canvas_u16(self.canvas)?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        {
            let mut painter = Painter { ctx: &mut ctx };
            draw(&mut painter);
        }
        ctx.flush();

        let mut layer = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut layer);
        self.over(layer.data_as_u8_slice())
    }

    /// Composite a premultiplied layer of identical size over this surface.
    pub fn over(&mut self, layer: &[u8]) -> StatwheelResult<()> {
        composite::over_in_place(self.data_mut(), layer)
    }

    /// Straight-alpha RGBA8 copy of the pixels.
    pub fn to_rgba8_straight(&self) -> Vec<u8> {
        let mut out = self.data().to_vec();
        crate::assets::decode::unpremultiply_rgba8_in_place(&mut out);
        out
    }
}

/// Draw calls available inside [`Surface::paint`].
pub struct Painter<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
}

impl Painter<'_> {
    pub fn fill_path(&mut self, path: &BezPath, color: Rgba8) {
        self.fill_path_with(path, color, Affine::IDENTITY);
    }

    pub fn fill_path_with(&mut self, path: &BezPath, color: Rgba8, transform: Affine) {
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgba8, transform: Affine) {
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    /// Stretch `image` onto `dst` under `transform`.
    pub fn draw_image(&mut self, image: &ImagePaint, dst: Rect, transform: Affine) {
        let (w, h) = (f64::from(image.canvas.width), f64::from(image.canvas.height));
        let place = Affine::translate((dst.x0, dst.y0))
            * Affine::scale_non_uniform(dst.width() / w, dst.height() / h);

        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(transform * place));
        self.ctx.set_paint(image.image.clone());
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
    }
}

/// Read-only pixel snapshot of a surface or portrait, ready to be drawn as a paint.
#[derive(Clone)]
pub struct ImagePaint {
    image: vello_cpu::Image,
    canvas: Canvas,
}

impl ImagePaint {
    pub fn from_surface(src: &Surface) -> StatwheelResult<Self> {
        Ok(Self {
            image: image_from_premul(src.data(), src.canvas())?,
            canvas: src.canvas(),
        })
    }

    pub fn from_portrait(portrait: &Portrait) -> StatwheelResult<Self> {
        Ok(Self {
            image: image_from_premul(portrait.rgba8_premul(), portrait.canvas())?,
            canvas: portrait.canvas(),
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }
}

fn canvas_u16(canvas: Canvas) -> StatwheelResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| StatwheelError::render("surface width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| StatwheelError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

fn image_from_premul(rgba8_premul: &[u8], canvas: Canvas) -> StatwheelResult<vello_cpu::Image> {
    let pixmap = premul_bytes_to_pixmap(rgba8_premul, canvas)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn premul_bytes_to_pixmap(rgba8_premul: &[u8], canvas: Canvas) -> StatwheelResult<vello_cpu::Pixmap> {
    let (w, h) = canvas_u16(canvas)?;
    if rgba8_premul.len() != canvas.byte_len() {
        return Err(StatwheelError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(canvas.width as usize * canvas.height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_oversized_surfaces() {
        assert!(Surface::with_size(70_000, 1).is_err());
        assert!(Surface::with_size(0, 1).is_err());
    }

    #[test]
    fn new_surface_is_transparent_and_fill_overwrites() {
        let mut s = Surface::with_size(4, 3).unwrap();
        assert!(s.data().iter().all(|&b| b == 0));
        s.fill(Rgba8::rgb(10, 20, 30));
        assert_eq!(s.pixel(3, 2), Some([10, 20, 30, 255]));
        assert_eq!(s.pixel(4, 0), None);
        s.clear();
        assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn paint_fills_rect_interior() {
        let mut s = Surface::with_size(32, 32).unwrap();
        s.paint(|p| {
            p.fill_rect(
                Rect::new(8.0, 8.0, 24.0, 24.0),
                Rgba8::rgb(200, 40, 40),
                Affine::IDENTITY,
            )
        })
        .unwrap();
        assert_eq!(s.pixel(16, 16), Some([200, 40, 40, 255]));
        assert_eq!(s.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn paint_composites_over_existing_pixels() {
        let mut s = Surface::with_size(16, 16).unwrap();
        s.fill(Rgba8::rgb(0, 0, 255));
        s.paint(|p| {
            p.fill_rect(
                Rect::new(0.0, 0.0, 8.0, 16.0),
                Rgba8::rgb(255, 0, 0),
                Affine::IDENTITY,
            )
        })
        .unwrap();
        assert_eq!(s.pixel(2, 8), Some([255, 0, 0, 255]));
        assert_eq!(s.pixel(12, 8), Some([0, 0, 255, 255]));
    }

    #[test]
    fn draw_surface_scales_into_destination() {
        let mut src = Surface::with_size(4, 4).unwrap();
        src.fill(Rgba8::rgb(0, 200, 0));

        let paint = ImagePaint::from_surface(&src).unwrap();
        let mut dst = Surface::with_size(40, 40).unwrap();
        dst.paint(|p| p.draw_image(&paint, Rect::new(10.0, 10.0, 30.0, 30.0), Affine::IDENTITY))
            .unwrap();
        let center = dst.pixel(20, 20).unwrap();
        assert!(center[1] > 190 && center[3] > 250, "{center:?}");
        assert_eq!(dst.pixel(2, 2), Some([0, 0, 0, 0]));
        assert_eq!(src.pixel(0, 0), Some([0, 200, 0, 255]));
    }

    #[test]
    fn straight_alpha_export_unpremultiplies() {
        let mut s = Surface::with_size(1, 1).unwrap();
        s.fill(Rgba8::rgba(200, 100, 0, 128));
        let straight = s.to_rgba8_straight();
        assert!((i32::from(straight[0]) - 200).abs() <= 1);
        assert_eq!(straight[3], 128);
    }
}
