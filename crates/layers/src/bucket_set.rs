use std::collections::HashMap;

use foundation::math::Vec3;
use tessellation::Tessellation;
use tracing::debug;

use crate::bucket::{Bucket, GeometryId, Region};
use crate::symbology::{Style, StyleKey};

/// Renderer-side sink for bucket buffers.
pub trait BufferUploader {
    fn upload(&mut self, bucket: &Bucket);

    /// The bucket for `key` became empty and was dropped.
    fn release(&mut self, key: StyleKey);
}

/// All buckets of a layer, one per distinct style.
#[derive(Debug, Clone, Default)]
pub struct BucketSet {
    origin: Vec3,
    buckets: Vec<Bucket>,
    owners: HashMap<GeometryId, StyleKey>,
}

impl BucketSet {
    pub fn new(origin: Vec3) -> Self {
        Self {
            origin,
            buckets: Vec::new(),
            owners: HashMap::new(),
        }
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn bucket(&self, style: &Style) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.is_compatible(style))
    }

    pub fn geometry_count(&self) -> usize {
        self.owners.len()
    }

    pub fn contains(&self, id: GeometryId) -> bool {
        self.owners.contains_key(&id)
    }

    pub fn add(&mut self, id: GeometryId, style: Style, tess: &Tessellation) -> Region {
        let key = style.key();
        if self.owners.get(&id).is_some_and(|k| *k != key) {
            self.remove(id);
        }

        let at = match self.buckets.iter().position(|b| b.key() == key) {
            Some(at) => at,
            None => {
                debug!(?key, "creating bucket");
                self.buckets.push(Bucket::new(style, self.origin));
                self.buckets.len() - 1
            }
        };
        self.owners.insert(id, key);
        self.buckets[at].add(id, tess)
    }

    pub fn remove(&mut self, id: GeometryId) -> bool {
        let Some(key) = self.owners.remove(&id) else {
            return false;
        };
        self.buckets
            .iter_mut()
            .find(|b| b.key() == key)
            .and_then(|b| b.remove(id))
            .is_some()
    }

    /// Hand every dirty bucket to `uploader`. Emptied buckets are released
    /// and dropped. Returns how many buckets were touched.
    pub fn flush(&mut self, uploader: &mut impl BufferUploader) -> usize {
        let mut touched = 0;
        self.buckets.retain_mut(|bucket| {
            if !bucket.is_dirty() {
                return true;
            }
            touched += 1;
            if bucket.is_empty() {
                uploader.release(bucket.key());
                return false;
            }
            uploader.upload(bucket);
            bucket.mark_clean();
            true
        });
        touched
    }
}

#[cfg(test)]
mod tests {
    use super::{BucketSet, BufferUploader};
    use crate::bucket::{Bucket, GeometryId};
    use crate::symbology::{Style, StyleKey};
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;
    use tessellation::Tessellation;

    #[derive(Default)]
    struct Recorder {
        uploads: Vec<(StyleKey, usize)>,
        released: Vec<StyleKey>,
    }

    impl BufferUploader for Recorder {
        fn upload(&mut self, bucket: &Bucket) {
            self.uploads.push((bucket.key(), bucket.positions().len() / 3));
        }

        fn release(&mut self, key: StyleKey) {
            self.released.push(key);
        }
    }

    fn segment() -> Tessellation {
        Tessellation {
            origin: Vec3::ZERO,
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            line_indices: vec![0, 1],
            triangle_indices: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn styles_partition_buckets() {
        let red = Style::stroke([1.0, 0.0, 0.0, 1.0], 1.0);
        let blue = Style::stroke([0.0, 0.0, 1.0, 1.0], 1.0);
        let mut set = BucketSet::new(Vec3::ZERO);
        set.add(GeometryId(1), red, &segment());
        set.add(GeometryId(2), red, &segment());
        set.add(GeometryId(3), blue, &segment());
        assert_eq!(set.buckets().len(), 2);
        assert_eq!(set.bucket(&red).map(|b| b.len()), Some(2));

        // Restyling moves the geometry.
        set.add(GeometryId(2), blue, &segment());
        assert_eq!(set.bucket(&red).map(|b| b.len()), Some(1));
        assert_eq!(set.bucket(&blue).map(|b| b.len()), Some(2));
    }

    #[test]
    fn flush_uploads_dirty_and_releases_empty() {
        let red = Style::stroke([1.0, 0.0, 0.0, 1.0], 1.0);
        let blue = Style::stroke([0.0, 0.0, 1.0, 1.0], 1.0);
        let mut set = BucketSet::new(Vec3::ZERO);
        set.add(GeometryId(1), red, &segment());
        set.add(GeometryId(2), blue, &segment());

        let mut rec = Recorder::default();
        assert_eq!(set.flush(&mut rec), 2);
        assert_eq!(set.flush(&mut rec), 0);

        assert!(set.remove(GeometryId(2)));
        assert!(!set.remove(GeometryId(2)));
        assert_eq!(set.flush(&mut rec), 1);
        assert_eq!(rec.released, vec![blue.key()]);
        assert_eq!(rec.uploads, vec![(red.key(), 2), (blue.key(), 2)]);
        assert_eq!(set.buckets().len(), 1);
        assert_eq!(set.geometry_count(), 1);
    }
}
