//! Draw backend abstraction and the CPU reference implementation.

use rustc_hash::FxHashMap;

use crate::color::Rgba;
use crate::geometry::{PixelRect, Point};
use crate::surface::Mirror;

/// Opaque handle to a backend-owned texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(u64);

/// How [`DrawBackend::draw_quad`] combines source pixels with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source-over alpha blending.
    #[default]
    Alpha,
    /// Overwrite target pixels exactly, alpha included.
    Replace,
}

/// The drawing services the pipeline consumes.
///
/// The pipeline never constructs textures' contents directly; everything is
/// expressed as clears and textured quads so a GPU implementation can map
/// each call onto its own primitives. Texture handles are owned by whoever
/// called [`create_texture`](Self::create_texture) and must be released
/// through [`release_texture`](Self::release_texture).
pub trait DrawBackend {
    /// Allocate a texture of the given pixel size, initially transparent.
    fn create_texture(&mut self, width: u32, height: u32) -> TextureId;

    /// Free a texture. Releasing an unknown id is a no-op.
    fn release_texture(&mut self, texture: TextureId);

    /// Pixel size of a texture, if it exists.
    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)>;

    /// Direct subsequent draw calls into a texture.
    fn begin_target(&mut self, texture: TextureId);

    /// Stop drawing into the current target.
    fn end_target(&mut self);

    /// Fill the current target with a color, replacing existing pixels.
    fn clear(&mut self, color: Rgba);

    /// Set the blend mode for subsequent quads.
    fn set_blend(&mut self, mode: BlendMode);

    /// Draw a region of `src` into the current target, scaled to `dst_rect`,
    /// each pixel multiplied by `tint`, optionally mirrored.
    fn draw_quad(
        &mut self,
        src: TextureId,
        src_rect: PixelRect,
        dst_rect: PixelRect,
        tint: Rgba,
        mirror: Mirror,
    );

    /// Hand a finished texture to the display at a pixel position.
    fn present(&mut self, texture: TextureId, position: Point, tint: Rgba);
}

#[derive(Debug, Clone)]
struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

/// A present call recorded by [`SoftwareBackend`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentOp {
    /// Texture that was presented.
    pub texture: TextureId,
    /// Pixel position on the display.
    pub position: Point,
    /// Tint applied at presentation.
    pub tint: Rgba,
}

/// CPU implementation of [`DrawBackend`] over plain pixel buffers.
///
/// Quads sample nearest-neighbor. Besides implementing the trait it exposes
/// the texture pixels, a draw-call counter, the recorded present queue, and
/// a live-texture count, which is what the integration tests assert against
/// (pixel-identical partial redraws, no-draw-call clean frames, no leaked
/// textures after reset).
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    textures: FxHashMap<TextureId, Texture>,
    next_id: u64,
    target: Option<TextureId>,
    blend: BlendMode,
    presents: Vec<PresentOp>,
    draw_calls: usize,
}

impl SoftwareBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of textures currently allocated.
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Clears and quads issued so far. Presents are not counted; a clean
    /// frame still presents its cached output.
    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    /// The pixels of a texture in row-major order.
    pub fn pixels(&self, texture: TextureId) -> Option<&[Rgba]> {
        self.textures.get(&texture).map(|t| t.pixels.as_slice())
    }

    /// Read one pixel of a texture.
    pub fn pixel(&self, texture: TextureId, x: u32, y: u32) -> Option<Rgba> {
        let t = self.textures.get(&texture)?;
        if x < t.width && y < t.height {
            Some(t.pixels[(y * t.width + x) as usize])
        } else {
            None
        }
    }

    /// Overwrite a texture's pixels, e.g. to install a font atlas. The data
    /// length must match the texture size.
    pub fn write_pixels(&mut self, texture: TextureId, pixels: &[Rgba]) -> bool {
        match self.textures.get_mut(&texture) {
            Some(t) if pixels.len() == t.pixels.len() => {
                t.pixels.copy_from_slice(pixels);
                true
            }
            _ => false,
        }
    }

    /// Allocate a texture filled with one color. Handy as a solid-white
    /// glyph atlas in tests.
    pub fn create_filled_texture(&mut self, width: u32, height: u32, color: Rgba) -> TextureId {
        let id = self.create_texture(width, height);
        if let Some(t) = self.textures.get_mut(&id) {
            t.pixels.fill(color);
        }
        id
    }

    /// Drain the recorded present calls.
    pub fn take_presents(&mut self) -> Vec<PresentOp> {
        std::mem::take(&mut self.presents)
    }
}

impl DrawBackend for SoftwareBackend {
    fn create_texture(&mut self, width: u32, height: u32) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.textures.insert(
            id,
            Texture {
                width,
                height,
                pixels: vec![Rgba::TRANSPARENT; (width as usize) * (height as usize)],
            },
        );
        id
    }

    fn release_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        if self.target == Some(texture) {
            self.target = None;
        }
    }

    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&texture).map(|t| (t.width, t.height))
    }

    fn begin_target(&mut self, texture: TextureId) {
        self.target = Some(texture);
    }

    fn end_target(&mut self) {
        self.target = None;
    }

    fn clear(&mut self, color: Rgba) {
        self.draw_calls += 1;
        if let Some(t) = self.target.and_then(|id| self.textures.get_mut(&id)) {
            t.pixels.fill(color);
        }
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn draw_quad(
        &mut self,
        src: TextureId,
        src_rect: PixelRect,
        dst_rect: PixelRect,
        tint: Rgba,
        mirror: Mirror,
    ) {
        self.draw_calls += 1;
        let Some(target_id) = self.target else {
            return;
        };
        if target_id == src
            || dst_rect.width == 0
            || dst_rect.height == 0
            || src_rect.width == 0
            || src_rect.height == 0
        {
            return;
        }
        // Pull the source out of the map so source and target can be
        // borrowed at the same time.
        let Some(source) = self.textures.remove(&src) else {
            return;
        };
        if let Some(target) = self.textures.get_mut(&target_id) {
            blit(target, &source, src_rect, dst_rect, tint, mirror, self.blend);
        }
        self.textures.insert(src, source);
    }

    fn present(&mut self, texture: TextureId, position: Point, tint: Rgba) {
        self.presents.push(PresentOp {
            texture,
            position,
            tint,
        });
    }
}

#[allow(clippy::too_many_arguments)]
fn blit(
    target: &mut Texture,
    source: &Texture,
    src_rect: PixelRect,
    dst_rect: PixelRect,
    tint: Rgba,
    mirror: Mirror,
    blend: BlendMode,
) {
    for dy in 0..dst_rect.height {
        let ty = dst_rect.y + dy as i32;
        if ty < 0 || ty >= target.height as i32 {
            continue;
        }
        let mut row = dy * src_rect.height / dst_rect.height;
        if mirror.contains(Mirror::VERTICAL) {
            row = src_rect.height - 1 - row;
        }
        let sy = src_rect.y + row as i32;
        for dx in 0..dst_rect.width {
            let tx = dst_rect.x + dx as i32;
            if tx < 0 || tx >= target.width as i32 {
                continue;
            }
            let mut col = dx * src_rect.width / dst_rect.width;
            if mirror.contains(Mirror::HORIZONTAL) {
                col = src_rect.width - 1 - col;
            }
            let sx = src_rect.x + col as i32;
            if sx < 0 || sy < 0 || sx >= source.width as i32 || sy >= source.height as i32 {
                continue;
            }
            let texel = source.pixels[(sy as u32 * source.width + sx as u32) as usize];
            let px = texel.modulate(tint);
            let dst_index = (ty as u32 * target.width + tx as u32) as usize;
            target.pixels[dst_index] = match blend {
                BlendMode::Alpha => px.over(target.pixels[dst_index]),
                BlendMode::Replace => px,
            };
        }
    }
}
