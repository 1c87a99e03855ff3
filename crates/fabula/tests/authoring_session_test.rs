//! Integration tests driving the public API the way a host application
//! would: record managers allocate identifiers, the chart and timeline
//! hold the state, and the controller consumes pointer events.

use fabula::chart::RelationshipChart;
use fabula::config::AppConfig;
use fabula::interaction::{GestureOutcome, InteractionController, PressTarget};
use fabula::timeline::OrderedIndex;
use fabula_core::geometry::Point;
use fabula_core::identifier::{EntityId, IdAllocator};

struct Session {
    alloc: IdAllocator,
    chart: RelationshipChart,
    timeline: OrderedIndex,
    controller: InteractionController,
}

fn session() -> Session {
    let config = AppConfig::default();
    Session {
        alloc: IdAllocator::new(),
        chart: RelationshipChart::new(config.chart().clone()),
        timeline: OrderedIndex::new(config.timeline().clone()),
        controller: InteractionController::new(),
    }
}

#[test]
fn test_chart_round_trip_through_snapshots() {
    let mut s = session();

    let hero = s.alloc.allocate();
    let rival = s.alloc.allocate();
    s.chart.add_node(hero, "Hero").unwrap();
    s.chart.add_node(rival, "Rival").unwrap();
    s.chart
        .set_node_position(rival, Point::new(400.0, 100.0))
        .unwrap();

    let assoc = s.alloc.allocate();
    let (start, end) = s
        .chart
        .add_association(&mut s.alloc, assoc, hero, rival, "rivals with")
        .unwrap();
    s.chart
        .set_endpoint_position(start, Point::new(120.0, 30.0))
        .unwrap();
    s.chart
        .set_endpoint_position(end, Point::new(400.0, 130.0))
        .unwrap();
    s.chart.center_label(assoc).unwrap();

    let node = s.chart.node_snapshot(rival).unwrap();
    assert_eq!(node.name, "Rival");
    assert_eq!(node.origin, Point::new(400.0, 100.0));

    let snapshot = s.chart.association_snapshot(assoc).unwrap();
    assert_eq!(snapshot.start_node, hero);
    assert_eq!(snapshot.end_node, rival);
    assert_eq!(snapshot.label, "rivals with");
    assert_eq!(snapshot.label_position, Point::new(260.0, 80.0));
}

#[test]
fn test_reattach_gesture_updates_persistable_state() {
    let mut s = session();

    let hero = s.alloc.allocate();
    let rival = s.alloc.allocate();
    let mentor = s.alloc.allocate();
    s.chart.add_node(hero, "Hero").unwrap();
    s.chart.add_node(rival, "Rival").unwrap();
    s.chart.add_node(mentor, "Mentor").unwrap();
    s.chart
        .set_node_position(rival, Point::new(400.0, 0.0))
        .unwrap();
    s.chart
        .set_node_position(mentor, Point::new(0.0, 400.0))
        .unwrap();

    let assoc = s.alloc.allocate();
    let (start, end) = s
        .chart
        .add_association(&mut s.alloc, assoc, hero, rival, "rivals with")
        .unwrap();
    s.chart
        .set_endpoint_position(start, Point::new(60.0, 60.0))
        .unwrap();
    s.chart
        .set_endpoint_position(end, Point::new(400.0, 30.0))
        .unwrap();

    // Drag the start endpoint from the hero onto the mentor.
    s.controller
        .press(
            &mut s.chart,
            Point::new(60.0, 60.0),
            PressTarget::Endpoint(start),
        )
        .unwrap();
    s.controller.hover_enter(mentor);
    s.controller
        .pointer_move(&mut s.chart, Point::new(60.0, 405.0))
        .unwrap();
    s.controller
        .release(&mut s.chart, Point::new(60.0, 405.0))
        .unwrap();

    assert_eq!(
        s.controller.last_outcome(),
        Some(GestureOutcome::EndpointAttached {
            endpoint: start,
            node: mentor,
        })
    );

    let snapshot = s.chart.association_snapshot(assoc).unwrap();
    assert_eq!(snapshot.start_node, mentor);
    assert_eq!(snapshot.end_node, rival);
    // Snapped to the mentor rectangle's top edge.
    assert_eq!(snapshot.start, Point::new(60.0, 400.0));
    // The label recentered on the new line.
    assert_eq!(snapshot.label_position, Point::new(230.0, 215.0));

    assert!(!s.chart.node(hero).unwrap().endpoints().any(|p| p == start));
    assert_eq!(s.chart.associations_of_node(mentor).unwrap(), vec![assoc]);
}

#[test]
fn test_abandoned_drag_leaves_no_trace() {
    let mut s = session();

    let hero = s.alloc.allocate();
    let rival = s.alloc.allocate();
    s.chart.add_node(hero, "Hero").unwrap();
    s.chart.add_node(rival, "Rival").unwrap();
    s.chart
        .set_node_position(rival, Point::new(400.0, 0.0))
        .unwrap();

    let assoc = s.alloc.allocate();
    let (start, _end) = s
        .chart
        .add_association(&mut s.alloc, assoc, hero, rival, "rivals with")
        .unwrap();
    s.chart
        .set_endpoint_position(start, Point::new(60.0, 60.0))
        .unwrap();
    let before = s.chart.association_snapshot(assoc).unwrap();

    s.controller
        .press(
            &mut s.chart,
            Point::new(60.0, 60.0),
            PressTarget::Endpoint(start),
        )
        .unwrap();
    s.controller
        .pointer_move(&mut s.chart, Point::new(700.0, 700.0))
        .unwrap();
    s.controller
        .release(&mut s.chart, Point::new(700.0, 700.0))
        .unwrap();

    assert_eq!(s.chart.association_snapshot(assoc).unwrap(), before);
}

#[test]
fn test_deferred_attach_from_context_action() {
    let mut s = session();

    let hero = s.alloc.allocate();
    let mentor = s.alloc.allocate();
    s.chart.add_node(hero, "Hero").unwrap();
    s.chart.add_node(mentor, "Mentor").unwrap();
    s.chart
        .set_node_position(mentor, Point::new(300.0, 300.0))
        .unwrap();

    // Association created with a dangling end from a menu action.
    let assoc = s.alloc.allocate();
    let (_start, end) = s
        .chart
        .add_association(&mut s.alloc, assoc, hero, EntityId::NONE, "trains under")
        .unwrap();

    s.controller
        .begin_pending_attach(&s.chart, assoc, true)
        .unwrap();
    s.controller
        .press(
            &mut s.chart,
            Point::new(310.0, 330.0),
            PressTarget::Node(mentor),
        )
        .unwrap();

    assert_eq!(s.chart.endpoint(end).unwrap().node(), mentor);
    assert_eq!(
        s.controller.last_outcome(),
        Some(GestureOutcome::EndpointAttached {
            endpoint: end,
            node: mentor,
        })
    );
}

#[test]
fn test_character_removal_cascades_to_chart() {
    let mut s = session();

    let hero = s.alloc.allocate();
    let rival = s.alloc.allocate();
    s.chart.add_node(hero, "Hero").unwrap();
    s.chart.add_node(rival, "Rival").unwrap();

    let assoc = s.alloc.allocate();
    let (start, end) = s
        .chart
        .add_association(&mut s.alloc, assoc, hero, rival, "rivals with")
        .unwrap();

    // The character record is deleted; its node leaves the chart.
    s.chart.remove_node(hero).unwrap();
    assert!(s.chart.endpoint(start).unwrap().is_dangling());
    assert_eq!(s.chart.endpoint(end).unwrap().node(), rival);

    // The association record is deleted too; its identifiers recycle.
    s.chart.remove_association(&mut s.alloc, assoc).unwrap();
    s.alloc.release(assoc).unwrap_err();
    assert!(s.chart.association(assoc).is_err());
}

#[test]
fn test_timeline_drag_survives_event_churn() {
    let mut s = session();
    let handle = s.timeline.default_list();

    let events: Vec<EntityId> = (0..4).map(|_| s.alloc.allocate()).collect();
    for event in &events {
        s.timeline.insert(*event);
    }
    s.timeline.layout(handle, |_| 80.0).unwrap();

    // The user drags the second event to a raw coordinate, then deletes
    // the third and adds a new one.
    s.timeline.move_to_absolute_x(events[1], 700.0);
    s.timeline.remove(events[2]);
    let late = s.alloc.allocate();
    s.timeline.insert(late);

    let layout = s.timeline.layout(handle, |_| 80.0).unwrap();
    assert_eq!(layout.position(events[0]), Some(20.0));
    assert_eq!(layout.position(events[1]), Some(700.0));
    assert_eq!(layout.position(events[2]), None);
    assert_eq!(layout.position(events[3]), Some(320.0));
    // The fresh event is placed after the accumulated width of the three
    // slots before it, regardless of where they were dragged.
    assert_eq!(layout.position(late), Some(320.0));
}

#[test]
fn test_alternate_ordering_shares_positions() {
    let mut s = session();
    let default = s.timeline.default_list();

    let a = s.alloc.allocate();
    let b = s.alloc.allocate();
    s.timeline.insert(a);
    s.timeline.insert(b);

    let filtered = s.timeline.add_order_list();
    let c = s.alloc.allocate();
    s.timeline.insert(c);

    s.timeline.layout(default, |_| 80.0).unwrap();
    let layout = s.timeline.layout(filtered, |_| 80.0).unwrap();

    // The filtered list only holds the event added after its creation,
    // and reuses the position cached by the default layout.
    assert_eq!(s.timeline.order(filtered).unwrap(), &[c]);
    assert_eq!(layout.position(c), Some(220.0));
}

#[test]
fn test_project_reload_clears_both_models() {
    let mut s = session();

    let hero = s.alloc.allocate();
    s.chart.add_node(hero, "Hero").unwrap();
    let assoc = s.alloc.allocate();
    s.chart
        .add_association(&mut s.alloc, assoc, hero, EntityId::NONE, "seeks")
        .unwrap();
    let event = s.alloc.allocate();
    s.timeline.insert(event);

    s.chart.clear(&mut s.alloc).unwrap();
    s.timeline.clear();

    assert_eq!(s.chart.node_count(), 0);
    assert_eq!(s.chart.association_count(), 0);
    assert!(s.timeline.order(s.timeline.default_list()).unwrap().is_empty());
}
