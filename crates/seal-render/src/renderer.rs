use seal_types::{DesignGrid, SealMetadata};
use tracing::{debug, warn};

use crate::cache::{GeometryCache, ReleaseResource};
use crate::config::RenderConfig;
use crate::error::RenderResult;
use crate::identity::VisualIdentity;
use crate::impression::ImpressionGenerator;
use crate::shape::Shape;

/// Host facility that turns a finished shape into a displayable handle.
pub trait MeshUploader {
    type Handle: ReleaseResource;

    fn upload(&mut self, shape: &Shape) -> RenderResult<Self::Handle>;
}

/// Per-session render hook for stamps and sealed containers.
///
/// Called every frame with an item's template and metadata; geometry is
/// built and uploaded only the first time a visual identity is seen.
pub struct SealRenderer<U: MeshUploader> {
    // Declared first so cached handles are released before the uploader drops.
    cache: GeometryCache<U::Handle>,
    generator: ImpressionGenerator,
    uploader: U,
}

impl<U: MeshUploader> SealRenderer<U> {
    pub fn new(config: RenderConfig, uploader: U) -> Self {
        Self {
            cache: GeometryCache::new(),
            generator: ImpressionGenerator::new(config),
            uploader,
        }
    }

    pub fn generator(&self) -> &ImpressionGenerator {
        &self.generator
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    pub fn cache(&self) -> &GeometryCache<U::Handle> {
        &self.cache
    }

    /// The handle for an item, building and uploading it on a cache miss.
    pub fn render(
        &mut self,
        template_id: &str,
        template: &Shape,
        meta: &SealMetadata,
    ) -> RenderResult<&U::Handle> {
        let identity = VisualIdentity::for_item(template_id, meta);
        let Self {
            cache,
            generator,
            uploader,
        } = self;
        cache.get_or_create(&identity, || {
            let shape = build_shape(&*generator, template, meta);
            debug!(key = %identity, elements = shape.element_count(), "uploading item geometry");
            uploader.upload(&shape)
        })
    }

    /// The shape an item renders as, without touching the cache.
    pub fn build_shape(&self, template: &Shape, meta: &SealMetadata) -> Shape {
        build_shape(&self.generator, template, meta)
    }

    /// Drop the cached geometry for an item, e.g. after its design changed.
    pub fn invalidate(&mut self, template_id: &str, meta: &SealMetadata) -> bool {
        self.cache
            .invalidate(&VisualIdentity::for_item(template_id, meta))
    }

    /// Release all cached geometry. Called at session unload.
    pub fn clear_all(&mut self) -> usize {
        self.cache.clear_all()
    }
}

/// Recolor the wax, then press the design into it (or onto the stamp face).
fn build_shape(generator: &ImpressionGenerator, template: &Shape, meta: &SealMetadata) -> Shape {
    let mut shape = template.clone();
    let color = meta.wax_color.as_deref();
    if let Some(color) = color {
        generator.recolor_wax(&mut shape, color);
    }

    let Some(design) = meta.stamp_design.as_deref() else {
        return shape;
    };
    let grid = match DesignGrid::from_design_string(design) {
        Ok(grid) => grid,
        Err(e) => {
            warn!(error = %e, "stamp design not decodable, rendering without it");
            return shape;
        }
    };
    match generator.style_for(&shape, color) {
        Some(style) => generator.apply(&shape, &grid, &style),
        None => {
            warn!("template has no stamp or wax node, rendering without design");
            shape
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use seal_types::StampId;

    use crate::error::RenderError;
    use crate::shape::{FaceSide, ShapeElement, ShapeFace};

    #[derive(Debug)]
    struct Handle {
        id: u32,
        released: Rc<RefCell<Vec<u32>>>,
    }

    impl ReleaseResource for Handle {
        fn release(self) {
            self.released.borrow_mut().push(self.id);
        }
    }

    #[derive(Default)]
    struct FakeUploader {
        uploaded: Vec<Shape>,
        released: Rc<RefCell<Vec<u32>>>,
        fail: bool,
    }

    impl MeshUploader for FakeUploader {
        type Handle = Handle;

        fn upload(&mut self, shape: &Shape) -> RenderResult<Handle> {
            if self.fail {
                return Err(RenderError::Upload("no context".into()));
            }
            self.uploaded.push(shape.clone());
            Ok(Handle {
                id: self.uploaded.len() as u32,
                released: Rc::clone(&self.released),
            })
        }
    }

    fn sealed_template() -> Shape {
        Shape::new(vec![
            ShapeElement::new("body", [0.0, 0.0, 0.0], [16.0, 1.0, 10.0])
                .with_faces(&FaceSide::ALL, &ShapeFace::new("#paper")),
            ShapeElement::new("wax", [6.0, 1.0, 3.0], [10.0, 1.5, 7.0])
                .with_faces(&FaceSide::ALL, &ShapeFace::new("#wax")),
        ])
    }

    fn sealed_meta(color: &str, design: &str) -> SealMetadata {
        let mut meta = SealMetadata::new();
        meta.wax_color = Some(color.into());
        meta.stamp_design = Some(design.into());
        meta
    }

    const RING: &str = "0110100110010110";

    fn renderer() -> SealRenderer<FakeUploader> {
        SealRenderer::new(RenderConfig::default(), FakeUploader::default())
    }

    #[test]
    fn repeated_frames_upload_once() {
        let mut r = renderer();
        let template = sealed_template();
        let meta = sealed_meta("blue", RING);
        for _ in 0..5 {
            r.render("envelope-sealed", &template, &meta).unwrap();
        }
        assert_eq!(r.uploader().uploaded.len(), 1);
        assert_eq!(r.cache().len(), 1);
    }

    #[test]
    fn color_and_design_select_distinct_meshes() {
        let mut r = renderer();
        let template = sealed_template();
        let a = r.render("t", &template, &sealed_meta("blue", RING)).unwrap().id;
        let b = r.render("t", &template, &sealed_meta("green", RING)).unwrap().id;
        let c = r.render("t", &template, &sealed_meta("blue", "1001")).unwrap().id;
        assert_eq!(vec![a, b, c], vec![1, 2, 3]);
    }

    #[test]
    fn stamp_id_alone_does_not_split_cache() {
        let mut r = renderer();
        let template = sealed_template();
        let mut a = sealed_meta("blue", RING);
        a.stamp_id = Some(StampId::new(3));
        let mut b = a.clone();
        b.stamp_id = Some(StampId::new(4));
        r.render("t", &template, &a).unwrap();
        r.render("t", &template, &b).unwrap();
        assert_eq!(r.uploader().uploaded.len(), 1);
    }

    #[test]
    fn uploaded_shape_is_recolored_and_impressed() {
        let mut r = renderer();
        r.render("t", &sealed_template(), &sealed_meta("blue", RING))
            .unwrap();
        let shape = &r.uploader().uploaded[0];
        let wax = shape.find("wax").unwrap();
        assert_eq!(wax.faces[&FaceSide::North].texture, "blue");
        assert!(!wax.children.is_empty());
        assert!(wax
            .children
            .iter()
            .all(|e| e.faces[&FaceSide::Up].texture == "blueimpression"));
        assert_eq!(shape.find("body").unwrap().faces[&FaceSide::Up].texture, "#paper");
    }

    #[test]
    fn template_without_anchor_uploads_unmodified() {
        let mut r = renderer();
        let template = Shape::new(vec![ShapeElement::new("body", [0.0; 3], [1.0; 3])]);
        r.render("plain", &template, &sealed_meta("blue", RING)).unwrap();
        assert_eq!(r.uploader().uploaded[0], template);
    }

    #[test]
    fn undecodable_design_renders_plain_wax() {
        let r = renderer();
        let shape = r.build_shape(&sealed_template(), &sealed_meta("blue", "011"));
        assert!(shape.find("wax").unwrap().children.is_empty());
    }

    #[test]
    fn invalidate_releases_and_reuploads() {
        let mut r = renderer();
        let template = sealed_template();
        let meta = sealed_meta("blue", RING);
        r.render("t", &template, &meta).unwrap();
        assert!(r.invalidate("t", &meta));
        assert_eq!(*r.uploader().released.borrow(), vec![1]);

        let id = r.render("t", &template, &meta).unwrap().id;
        assert_eq!(id, 2);
    }

    #[test]
    fn upload_failure_caches_nothing() {
        let mut r = renderer();
        r.uploader.fail = true;
        let template = sealed_template();
        let meta = sealed_meta("blue", RING);
        assert!(matches!(
            r.render("t", &template, &meta),
            Err(RenderError::Upload(_))
        ));
        assert!(r.cache().is_empty());

        r.uploader.fail = false;
        r.render("t", &template, &meta).unwrap();
        assert_eq!(r.cache().len(), 1);
    }

    #[test]
    fn dropping_renderer_releases_handles() {
        let released = {
            let mut r = renderer();
            let template = sealed_template();
            r.render("t", &template, &sealed_meta("blue", RING)).unwrap();
            r.render("t", &template, &sealed_meta("red", RING)).unwrap();
            Rc::clone(&r.uploader().released)
        };
        let mut ids = released.borrow().clone();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }
}
