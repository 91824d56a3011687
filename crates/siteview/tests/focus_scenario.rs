use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use siteview::{
    camera::CameraPose,
    config::EngineConfig,
    focus::{FocusState, InView, Transition},
    glam::Vec3,
    label::{LabelHandle, LabelProvider, LabelRequest},
    picker::SurfaceRect,
    Building, Engine, EngineHandle, Site,
};

fn building(id: &str, origin_x: f32, origin_z: f32) -> Building {
    Building {
        id: id.to_string(),
        name: format!("Building {}", id),
        width_x: 10.0,
        width_z: 10.0,
        height_y: 20.0,
        origin_x,
        origin_z,
    }
}

fn site() -> Site {
    Site {
        id: String::from("s1"),
        name: String::from("Campus"),
        width_x: 50.0,
        width_z: 50.0,
        buildings: vec![building("b1", 5.0, 5.0), building("b2", -15.0, -15.0)],
    }
}

fn engine() -> Engine {
    let mut engine =
        Engine::new(EngineConfig::default(), SurfaceRect::from_size(800.0, 800.0)).unwrap();
    engine.load_site(&site()).unwrap();
    engine.advance(Duration::from_millis(700));
    engine
}

fn opacity(engine: &Engine, id: &str) -> f32 {
    engine.graph().unwrap().get(id).unwrap().opacity()
}

#[test]
fn test_focus_and_return() {
    let mut engine = engine();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    engine.subscribe(move |event| sink.lock().unwrap().push(event.in_view()));

    let (x, y) = engine.client_point_of("b1").unwrap();
    assert_eq!(engine.click(x, y), Transition::Focused(String::from("b1")));
    assert_eq!(engine.focus(), &FocusState::Focused(String::from("b1")));
    assert_eq!(opacity(&engine, "b1"), 1.0);
    assert_eq!(opacity(&engine, "b1#label"), 1.0);
    assert_eq!(opacity(&engine, "b2"), 0.1);
    assert_eq!(opacity(&engine, "b2#label"), 0.1);

    engine.advance(Duration::from_millis(350));
    assert!(engine.is_animating());
    let pose = engine.advance(Duration::from_millis(350));
    let closeup = CameraPose::new(Vec3::new(5.0, 20.0, 25.0), Vec3::new(5.0, 10.0, 5.0));
    assert!(pose.abs_diff_eq(&closeup, 1e-4));
    assert!(!engine.is_animating());

    // Top edge of the surface looks past the ground from the close-up
    assert_eq!(engine.click(400.0, 1.0), Transition::Overview);
    assert_eq!(engine.focus(), &FocusState::Default);
    assert_eq!(opacity(&engine, "b2"), 1.0);
    let pose = engine.advance(Duration::from_millis(700));
    assert!(pose.abs_diff_eq(&engine.overview_pose(), 1e-4));

    assert_eq!(*events.lock().unwrap(), vec![InView::Building, InView::Site]);
}

#[test]
fn test_single_building_site_round_trip() {
    let mut engine =
        Engine::new(EngineConfig::default(), SurfaceRect::from_size(800.0, 800.0)).unwrap();
    let mut site = site();
    site.buildings.truncate(1);
    engine.load_site(&site).unwrap();
    engine.advance(Duration::from_millis(700));

    let (x, y) = engine.client_point_of("b1").unwrap();
    assert_eq!(engine.click(x, y), Transition::Focused(String::from("b1")));
    let pose = engine.advance(Duration::from_millis(700));
    let closeup = CameraPose::new(Vec3::new(5.0, 20.0, 25.0), Vec3::new(5.0, 10.0, 5.0));
    assert!(pose.abs_diff_eq(&closeup, 1e-4));
    assert_eq!(opacity(&engine, "b1"), 1.0);

    assert_eq!(engine.click(400.0, 1.0), Transition::Overview);
    assert_eq!(engine.focus(), &FocusState::Default);
    let pose = engine.advance(Duration::from_millis(700));
    assert!(pose.abs_diff_eq(&engine.overview_pose(), 1e-4));
    assert_eq!(opacity(&engine, "b1"), 1.0);
}

#[test]
fn test_sky_click_from_inside_focused_building() {
    let mut engine = engine();
    let mut large = site();
    large.buildings = vec![Building {
        id: String::from("big"),
        name: String::from("Hall"),
        width_x: 60.0,
        width_z: 60.0,
        height_y: 50.0,
        origin_x: 0.0,
        origin_z: 0.0,
    }];
    engine.load_site(&large).unwrap();
    engine.focus_building("big");
    let pose = engine.advance(Duration::from_millis(700));
    let bounds = engine
        .graph()
        .unwrap()
        .world_bounds(engine.graph().unwrap().index_of("big").unwrap())
        .unwrap();
    assert!(bounds.contains(pose.position));

    assert_eq!(engine.click(400.0, 1.0), Transition::Overview);
    assert_eq!(engine.focus(), &FocusState::Default);
}

#[test]
fn test_refocus_mid_flight() {
    let mut engine = engine();
    engine.focus_building("b1");
    engine.advance(Duration::from_millis(200));
    engine.focus_building("b2");
    assert_eq!(opacity(&engine, "b1"), 0.1);
    assert_eq!(opacity(&engine, "b2"), 1.0);
    let pose = engine.advance(Duration::from_millis(700));
    assert!(pose.abs_diff_eq(&engine.closeup_pose("b2").unwrap(), 1e-4));
}

#[test]
fn test_repick_focused_building_is_noop() {
    let mut engine = engine();
    let (x, y) = engine.client_point_of("b1").unwrap();
    engine.click(x, y);
    engine.advance(Duration::from_millis(700));
    let (x, y) = engine.client_point_of("b1").unwrap();
    assert_eq!(engine.click(x, y), Transition::Unchanged);
    assert!(!engine.is_animating());
}

#[test]
fn test_rejected_reload_keeps_scene() {
    let mut engine = engine();
    engine.focus_building("b1");
    let mut broken = site();
    broken.buildings.push(building("b1", 20.0, 20.0));
    assert!(engine.load_site(&broken).is_err());
    assert_eq!(engine.focus(), &FocusState::Focused(String::from("b1")));
    assert_eq!(engine.graph().unwrap().len(), 5);
}

struct QueuedLabels {
    handle: EngineHandle,
    requests: Arc<Mutex<Vec<LabelRequest>>>,
}

impl LabelProvider for QueuedLabels {
    fn request_label(&mut self, request: LabelRequest) {
        self.requests.lock().unwrap().push(request.clone());
        self.handle
            .label_ready(request.key, LabelHandle(request.text.len() as u64))
            .unwrap();
    }
}

#[test]
fn test_stale_labels_dropped_after_reload() {
    let engine =
        Engine::new(EngineConfig::default(), SurfaceRect::from_size(800.0, 800.0)).unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let provider = QueuedLabels {
        handle: engine.handle(),
        requests: requests.clone(),
    };
    let mut engine = engine.with_label_provider(provider);

    engine.load_site(&site()).unwrap();
    let mut smaller = site();
    smaller.buildings.truncate(1);
    engine.load_site(&smaller).unwrap();
    engine.advance(Duration::from_millis(16));

    assert_eq!(requests.lock().unwrap().len(), 3);
    assert_eq!(engine.labels().len(), 1);
    assert_eq!(engine.labels().pending(), 0);
    assert!(engine.labels().handle("b1#label").is_some());
    assert!(engine.labels().handle("b2#label").is_none());
}
