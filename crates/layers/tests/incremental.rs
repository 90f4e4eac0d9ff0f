use crs::CrsRegistry;
use formats::Geometry;
use foundation::math::Vec3;
use layers::{BucketSet, GeometryId, Style};
use pretty_assertions::assert_eq;
use tessellation::{TessellationConfig, Tessellator};

fn tessellator() -> Tessellator {
    Tessellator::from_registry(
        &CrsRegistry::with_defaults(),
        "Equatorial",
        TessellationConfig::default(),
    )
    .expect("tessellator")
}

#[test]
fn removing_a_geometry_restores_the_prior_buffers() {
    let t = tessellator();
    let style = Style::stroke([0.2, 0.8, 0.2, 1.0], 1.5).filled([0.2, 0.8, 0.2, 0.3]);
    let g1 = t.tessellate(&Geometry::polygon(&[&[
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 10.0),
        (0.0, 10.0),
        (0.0, 0.0),
    ]]));
    let g2 = t.tessellate(&Geometry::line_string(&[(40.0, -5.0), (60.0, 5.0)]));
    let g3 = t.tessellate(&Geometry::polygon(&[&[
        (-30.0, 20.0),
        (-20.0, 20.0),
        (-25.0, 30.0),
        (-30.0, 20.0),
    ]]));

    let origin = Vec3::new(6.0e6, 0.0, 0.0);
    let mut incremental = BucketSet::new(origin);
    incremental.add(GeometryId(1), style, &g1);
    incremental.add(GeometryId(2), style, &g2);
    incremental.add(GeometryId(3), style, &g3);
    assert!(incremental.remove(GeometryId(1)));

    let mut fresh = BucketSet::new(origin);
    fresh.add(GeometryId(2), style, &g2);
    fresh.add(GeometryId(3), style, &g3);

    let (a, b) = (&incremental.buckets()[0], &fresh.buckets()[0]);
    assert_eq!(a.positions(), b.positions());
    assert_eq!(a.line_indices(), b.line_indices());
    assert_eq!(a.triangle_indices(), b.triangle_indices());
    assert_eq!(a.regions(), b.regions());
}

#[test]
fn regions_index_only_their_own_vertices() {
    let t = tessellator();
    let style = Style::default();
    let mut set = BucketSet::new(Vec3::ZERO);
    for (id, lon) in [(1, 0.0), (2, 30.0), (3, 60.0)] {
        let line = Geometry::line_string(&[(lon, 0.0), (lon + 5.0, 5.0)]);
        set.add(GeometryId(id), style, &t.tessellate(&line));
    }
    set.remove(GeometryId(2));

    let bucket = &set.buckets()[0];
    for (_, r) in bucket.regions() {
        let range = r.vertex_start..r.vertex_start + r.vertex_count;
        let lines = &bucket.line_indices()[r.line_start as usize..(r.line_start + r.line_count) as usize];
        assert!(lines.iter().all(|i| range.contains(i)));
    }
    assert_eq!(bucket.positions().len() / 3, bucket.regions().iter().map(|(_, r)| r.vertex_count as usize).sum::<usize>());
}
