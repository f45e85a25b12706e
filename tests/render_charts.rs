use statwheel::{
    Canvas, CharacterProfile, GaugeConfig, GaugeRenderer, LevelMode, RawProfile, RawStats, Rgba8,
    Stats, SunburstConfig, SunburstRenderer, Surface, TextRasterizer, gauge_color,
    geometry::{polar_point, section_span},
    sunburst_color,
};

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn digest_u64(bytes: &[u8]) -> u64 {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for chunk in bytes.chunks(8) {
        let mut v = 0u64;
        for (i, &b) in chunk.iter().enumerate() {
            v |= (b as u64) << (i * 8);
        }
        state = mix64(state ^ v);
    }
    state
}

fn assert_near(actual: [u8; 4], expected: Rgba8, what: &str) {
    let want = [expected.r, expected.g, expected.b, expected.a];
    let close = actual
        .iter()
        .zip(want.iter())
        .all(|(&a, &b)| (i16::from(a) - i16::from(b)).abs() <= 2);
    assert!(close, "{what}: got {actual:?}, expected {want:?}");
}

fn sample(surface: &Surface, center: statwheel::Point, radius: f64, angle: f64) -> [u8; 4] {
    let p = polar_point(center, radius, angle);
    surface
        .pixel(p.x.floor() as u32, p.y.floor() as u32)
        .expect("sample point inside surface")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn gauge() -> GaugeRenderer {
    GaugeRenderer::new(GaugeConfig::default(), TextRasterizer::shared())
}

fn sunburst() -> SunburstRenderer {
    SunburstRenderer::new(SunburstConfig::default(), TextRasterizer::shared())
}

#[test]
fn gauge_render_is_deterministic() {
    let mut a = Surface::new(Canvas::square(256).unwrap()).unwrap();
    let mut b = Surface::new(Canvas::square(256).unwrap()).unwrap();
    gauge().render(&mut a, 6.4).unwrap();
    gauge().render(&mut b, 6.4).unwrap();
    assert_eq!(digest_u64(a.data()), digest_u64(b.data()));
}

#[test]
fn rerender_replaces_previous_drawing() {
    let mut fresh = Surface::new(Canvas::square(200).unwrap()).unwrap();
    gauge().render(&mut fresh, 2.0).unwrap();

    let mut reused = Surface::new(Canvas::square(200).unwrap()).unwrap();
    gauge().render(&mut reused, 9.9).unwrap();
    gauge().render(&mut reused, 2.0).unwrap();

    assert_eq!(fresh.data(), reused.data());
}

#[test]
fn gauge_paints_seven_wedges_and_a_partial_for_seven_point_three() {
    init_tracing();
    let mut s = Surface::new(Canvas::square(400).unwrap()).unwrap();
    let plan = gauge().render(&mut s, 7.3).unwrap();
    assert_eq!(plan.full_wedges(), 7);
    let partial = plan.partial_wedge().unwrap();
    assert_eq!(partial.index, 7);
    assert!((partial.span.sweep.to_degrees() - 10.8).abs() < 1e-6);

    let mid = plan.band.lerp(0.5);
    for i in 0..7 {
        let px = sample(&s, plan.center, mid, section_span(10, i).mid());
        assert_near(px, gauge_color(i), &format!("wedge {i}"));
    }

    let wedge7 = section_span(10, 7);
    let inside = sample(&s, plan.center, mid, wedge7.start + 5.4_f64.to_radians());
    assert_near(inside, gauge_color(7), "partial wedge");
    let beyond = sample(&s, plan.center, mid, wedge7.start + 25.0_f64.to_radians());
    assert_near(beyond, GaugeConfig::default().track_color, "track past partial");

    for i in 8..10 {
        let px = sample(&s, plan.center, mid, section_span(10, i).mid());
        assert_near(px, GaugeConfig::default().track_color, &format!("track {i}"));
    }
}

#[test]
fn gauge_outside_the_ring_stays_transparent() {
    let mut s = Surface::new(Canvas::square(400).unwrap()).unwrap();
    gauge().render(&mut s, 10.0).unwrap();
    assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(399, 399), Some([0, 0, 0, 0]));
}

#[test]
fn non_numeric_overall_draws_a_single_wedge_labelled_one() {
    let raw = RawProfile {
        overall: serde_json::json!("abc"),
        ..RawProfile::default()
    };
    let profile = CharacterProfile::from_raw(&raw, LevelMode::default());
    assert_eq!(profile.overall, 1.0);

    let mut s = Surface::new(Canvas::square(300).unwrap()).unwrap();
    let plan = gauge().render(&mut s, profile.overall).unwrap();
    assert_eq!(plan.full_wedges(), 1);
    assert!(plan.partial_wedge().is_none());
    assert_eq!(plan.label.text, "1.0");

    let mid = plan.band.lerp(0.5);
    assert_near(
        sample(&s, plan.center, mid, section_span(10, 0).mid()),
        gauge_color(0),
        "first wedge",
    );
    assert_near(
        sample(&s, plan.center, mid, section_span(10, 1).mid()),
        GaugeConfig::default().track_color,
        "second wedge",
    );
}

#[test]
fn sunburst_fills_rings_per_stat() {
    init_tracing();
    let stats = RawStats::from_numbers([10.0, 1.0, 5.9, 1.0, 1.0, 1.0, 1.0]).normalize();
    let mut s = Surface::new(Canvas::square(400).unwrap()).unwrap();
    let plan = sunburst().render(&mut s, &stats).unwrap();

    assert_eq!(plan.cells_in_sector(0), 10);
    assert_eq!(plan.cells_in_sector(1), 1);
    assert_eq!(plan.cells_in_sector(2), 5);

    let thickness = plan.base.thickness() / 10.0;
    let ring_mid = |r: usize| plan.base.inner + thickness * (r as f64 + 0.5);
    let bg = SunburstConfig::default().background_color;

    assert_near(
        sample(&s, plan.center, ring_mid(9), section_span(7, 0).mid()),
        sunburst_color(0, 9),
        "energy outer ring",
    );
    assert_near(
        sample(&s, plan.center, ring_mid(0), section_span(7, 1).mid()),
        sunburst_color(1, 0),
        "speed first ring",
    );
    assert_near(
        sample(&s, plan.center, ring_mid(9), section_span(7, 1).mid()),
        bg,
        "speed outer ring",
    );
    assert_near(
        sample(&s, plan.center, ring_mid(4), section_span(7, 2).mid()),
        sunburst_color(2, 4),
        "support fifth ring",
    );
    assert_near(
        sample(&s, plan.center, ring_mid(9), section_span(7, 2).mid()),
        bg,
        "support outer ring",
    );
    assert_near(
        s.pixel(200, 200).unwrap(),
        SunburstConfig::default().hub_color,
        "hub",
    );
}

#[test]
fn sunburst_hub_covers_labels() {
    // Hub wider than the canvas: nothing drawn earlier may show through.
    let cfg = SunburstConfig {
        hub_radius: 20.0,
        ..SunburstConfig::default()
    };
    let renderer = SunburstRenderer::new(cfg.clone(), TextRasterizer::shared());
    let mut s = Surface::new(Canvas::square(200).unwrap()).unwrap();
    let plan = renderer.render(&mut s, &Stats::new([10.0; 7])).unwrap();

    for label in &plan.labels {
        let px = s
            .pixel(label.origin.x.floor() as u32, label.origin.y.floor() as u32)
            .unwrap();
        assert_near(px, cfg.hub_color, &format!("label {}", label.text));
    }
    assert_near(s.pixel(0, 0).unwrap(), cfg.hub_color, "corner");
}

#[test]
fn sunburst_render_is_deterministic() {
    let stats = Stats::new([3.0, 7.5, 2.0, 9.0, 4.4, 1.0, 6.0]);
    let mut a = Surface::new(Canvas::square(240).unwrap()).unwrap();
    let mut b = Surface::new(Canvas::square(240).unwrap()).unwrap();
    sunburst().render(&mut a, &stats).unwrap();
    sunburst().render(&mut b, &stats).unwrap();
    assert_eq!(digest_u64(a.data()), digest_u64(b.data()));
}

#[test]
fn non_square_surfaces_use_the_shorter_edge() {
    let mut s = Surface::new(Canvas::new(500, 300).unwrap()).unwrap();
    let plan = gauge().render(&mut s, 5.0).unwrap();
    assert_eq!(plan.center, statwheel::Point::new(250.0, 150.0));
    assert!((plan.band.outer - 300.0 * 0.36).abs() < 1e-9);
    assert_eq!(s.pixel(10, 150), Some([0, 0, 0, 0]));
}
