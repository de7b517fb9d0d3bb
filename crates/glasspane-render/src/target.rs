//! The offscreen reflection target: one color texture plus one depth buffer.
//!
//! Resizing never touches attachments in place. The whole target is torn
//! down and rebuilt at the new size, so color and depth can never drift out
//! of agreement across a resize.

use crate::error::{RenderError, RenderResult};

/// Color format of the reflection buffer, matched by the glass pipeline's
/// sampler binding.
pub const REFLECTION_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Depth format shared by the reflection target and the main pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Offscreen color + depth pair the reflection pass renders into and the
/// composite pass samples from.
pub struct ReflectionTarget {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl ReflectionTarget {
    /// Creates a target sized to the viewport. Zero dimensions are clamped
    /// to 1 (wgpu forbids zero extents); the queued-resize path never passes
    /// zero in normal operation.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Reflection Color"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: REFLECTION_COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Reflection Depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            color,
            color_view,
            depth,
            depth_view,
            width,
            height,
        }
    }

    /// Rebuilds the target at a new size. Full teardown, not an in-place
    /// resize; the old attachments drop here.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        *self = Self::new(device, width, height);
    }

    /// Verifies attachment completeness before the target is rendered into.
    ///
    /// # Errors
    /// [`RenderError::FramebufferIncomplete`] if the color and depth
    /// attachments disagree in size. Fatal to this target; the caller must
    /// not render into it.
    pub fn validate(&self) -> RenderResult<()> {
        let (cw, ch) = (self.color.width(), self.color.height());
        let (dw, dh) = (self.depth.width(), self.depth.height());
        if cw != dw || ch != dh {
            return Err(RenderError::FramebufferIncomplete {
                color_width: cw,
                color_height: ch,
                depth_width: dw,
                depth_height: dh,
            });
        }
        Ok(())
    }

    /// Begins a render pass into this target, clearing color and depth.
    pub fn begin_pass<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
        clear_color: [f64; 4],
    ) -> wgpu::RenderPass<'a> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Reflection Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear_color[0],
                        g: clear_color[1],
                        b: clear_color[2],
                        a: clear_color[3],
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        })
    }

    /// The color view sampled by the composite pass.
    #[must_use]
    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color_view
    }

    /// Current width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::FutureExt;

    /// Acquires a device for attachment tests. Returns `None` when no GPU
    /// adapter (real or software fallback) is available, so the tests can
    /// skip instead of failing on adapterless CI.
    fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .block_on()?;
        adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("target test device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .block_on()
            .ok()
    }

    #[test]
    fn test_zero_extent_clamped_to_one() {
        let Some((device, _queue)) = create_test_device() else {
            eprintln!("skipping: no GPU adapter available");
            return;
        };
        let target = ReflectionTarget::new(&device, 0, 0);
        assert_eq!(target.width(), 1);
        assert_eq!(target.height(), 1);
        assert!(target.validate().is_ok());
    }

    #[test]
    fn test_matching_attachments_validate() {
        let Some((device, _queue)) = create_test_device() else {
            eprintln!("skipping: no GPU adapter available");
            return;
        };
        let target = ReflectionTarget::new(&device, 320, 240);
        assert!(target.validate().is_ok());
        assert_eq!(target.color.width(), target.depth.width());
    }

    #[test]
    fn test_mismatched_attachments_are_incomplete() {
        let Some((device, _queue)) = create_test_device() else {
            eprintln!("skipping: no GPU adapter available");
            return;
        };
        let a = ReflectionTarget::new(&device, 64, 64);
        let b = ReflectionTarget::new(&device, 32, 32);
        let stitched = ReflectionTarget {
            color: a.color,
            color_view: a.color_view,
            depth: b.depth,
            depth_view: b.depth_view,
            width: 64,
            height: 64,
        };
        let err = stitched.validate().unwrap_err();
        assert!(matches!(
            err,
            RenderError::FramebufferIncomplete {
                color_width: 64,
                depth_width: 32,
                ..
            }
        ));
    }

    #[test]
    fn test_resize_rebuilds_at_new_size() {
        let Some((device, _queue)) = create_test_device() else {
            eprintln!("skipping: no GPU adapter available");
            return;
        };
        let mut target = ReflectionTarget::new(&device, 320, 240);
        target.resize(&device, 640, 360);
        assert_eq!((target.width(), target.height()), (640, 360));
        assert_eq!(target.color.width(), 640);
        assert_eq!(target.depth.height(), 360);
        assert!(target.validate().is_ok());
    }
}
