//! End-to-end recording against an in-memory page

use parking_lot::Mutex;
use std::sync::Arc;
use stepcorder_core::{selector_of, EventKind, ErrorCode, NodeId, Page, Rect};
use stepcorder_recorder::overlay::CONTAINER_ID;
use stepcorder_recorder::{
    subscriber, Recorder, RecorderConfig, RecorderState, Step, StepKind, Subscriber,
};

fn collector() -> (Arc<Mutex<Vec<Step>>>, Subscriber) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    let sub = subscriber(move |step| {
        s.lock().push(step.clone());
        Ok(())
    });
    (seen, sub)
}

/// `<body><button id="go">` plus a three-item list
fn page() -> (Arc<Page>, NodeId, Vec<NodeId>) {
    let page = Arc::new(Page::default());
    let (button, items) = {
        let mut doc = page.document_mut();
        let body = doc.body().unwrap();
        let button = doc.create_element(body, "button").unwrap();
        doc.set_attribute(button, "id", "go").unwrap();
        let ul = doc.create_element(body, "ul").unwrap();
        let items = (0..3).map(|_| doc.create_element(ul, "li").unwrap()).collect();
        (button, items)
    };
    (page, button, items)
}

#[test]
fn click_on_id_button_reaches_every_subscriber() {
    let (page, button, _) = page();
    let mut recorder = Recorder::for_page(page.clone(), RecorderConfig::default());
    let (first, a) = collector();
    let (second, b) = collector();
    recorder.subscribe(a);
    recorder.subscribe(b);

    recorder.start().unwrap();
    page.click(button).unwrap();

    let expected = vec![Step::click(button, "button#go")];
    assert_eq!(*first.lock(), expected);
    assert_eq!(*second.lock(), expected);
}

#[test]
fn second_start_fails_and_state_stays_started() {
    let (page, _, _) = page();
    let mut recorder = Recorder::for_page(page, RecorderConfig::default());
    recorder.start().unwrap();
    let err = recorder.start().unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);
    assert!(!err.suggestions.is_empty());
    assert_eq!(recorder.state(), RecorderState::Started);
}

#[test]
fn paused_events_are_dropped_and_resume_records_scroll() {
    let (page, button, _) = page();
    let mut recorder = Recorder::for_page(page.clone(), RecorderConfig::default());
    let (seen, sub) = collector();
    recorder.subscribe(sub);

    recorder.start().unwrap();
    recorder.pause();
    page.click(button).unwrap();
    page.wheel(0.0, 40.0).unwrap();
    assert!(seen.lock().is_empty());

    recorder.resume().unwrap();
    page.wheel(0.0, 120.0).unwrap();

    let seen = seen.lock();
    assert_eq!(*seen, vec![Step::scroll(0.0, 120.0)]);
    assert_eq!(
        serde_json::to_value(&seen[0]).unwrap()["scrollDelta"],
        serde_json::json!({ "x": 0.0, "y": 120.0 })
    );
}

#[test]
fn middle_sibling_gets_nth_child() {
    let (page, _, items) = page();
    let doc = page.document();
    assert_eq!(selector_of(&doc, items[1]).unwrap(), "li:nth-child(2)");
    assert_eq!(selector_of(&doc, items[0]).unwrap(), "li:first-child");
}

#[test]
fn subscriber_before_start_sees_steps_in_arrival_order() {
    let (page, button, items) = page();
    let mut recorder = Recorder::for_page(page.clone(), RecorderConfig::default());
    let (seen, sub) = collector();
    recorder.subscribe(sub);
    recorder.start().unwrap();

    page.click(items[2]).unwrap();
    page.key_down(button, "Enter").unwrap();
    page.wheel(5.0, -10.0).unwrap();
    page.wheel(5.0, -10.0).unwrap();

    let kinds: Vec<StepKind> = seen.lock().iter().map(Step::kind).collect();
    assert_eq!(
        kinds,
        vec![StepKind::Click, StepKind::Keydown, StepKind::Scroll, StepKind::Scroll]
    );
    assert_eq!(
        seen.lock()[0].selector(),
        Some("body:nth-child(2) > ul:nth-child(2) > li:nth-child(3)")
    );
    assert_eq!(seen.lock()[1], Step::keydown(button, "button#go", "Enter"));
    assert_eq!(recorder.steps(), *seen.lock());
}

#[test]
fn selector_survives_element_removal() {
    let (page, _, items) = page();
    let mut recorder = Recorder::for_page(page.clone(), RecorderConfig::default());
    recorder.start().unwrap();
    page.click(items[1]).unwrap();

    page.document_mut().remove(items[1]).unwrap();
    let steps = recorder.steps();
    assert_eq!(
        steps[0].selector(),
        Some("body:nth-child(2) > ul:nth-child(2) > li:nth-child(2)")
    );
    assert_eq!(steps[0].element(), Some(items[1]));
}

#[test]
fn text_node_clicks_record_the_parent_element() {
    let page = Arc::new(Page::default());
    let (link, text) = {
        let mut doc = page.document_mut();
        let body = doc.body().unwrap();
        let link = doc.create_element(body, "a").unwrap();
        doc.set_attribute(link, "href", "/pricing").unwrap();
        let text = doc.create_text(link, "Pricing").unwrap();
        (link, text)
    };
    let mut recorder = Recorder::for_page(page.clone(), RecorderConfig::default());
    recorder.start().unwrap();

    page.click(text).unwrap();
    assert_eq!(recorder.steps(), vec![Step::click(link, "a[href=/pricing]")]);
}

#[test]
fn clicks_without_selector_path_are_skipped() {
    let (page, _, _) = page();
    let html = page.document().document_element().unwrap();
    let root = page.document().root();
    let mut recorder = Recorder::for_page(page.clone(), RecorderConfig::default());
    recorder.start().unwrap();

    page.click(html).unwrap();
    page.click(root).unwrap();
    assert!(recorder.steps().is_empty());
}

#[test]
fn stop_then_events_reach_nobody() {
    let (page, button, _) = page();
    let mut recorder = Recorder::for_page(page.clone(), RecorderConfig::default());
    let (seen, sub) = collector();
    recorder.subscribe(sub);
    recorder.start().unwrap();
    recorder.stop();

    page.click(button).unwrap();
    assert!(seen.lock().is_empty());
    assert!(recorder.steps().is_empty());
    assert_eq!(recorder.state(), RecorderState::Stopped);
}

#[test]
fn restarting_a_stopped_recorder_fails() {
    let (page, button, _) = page();
    let mut recorder = Recorder::for_page(page.clone(), RecorderConfig::default());
    recorder.start().unwrap();
    recorder.stop();
    assert!(recorder.start().unwrap_err().is_invalid_transition());

    page.click(button).unwrap();
    assert!(recorder.steps().is_empty());
}

#[test]
fn unsubscribe_twice_leaves_others_alone() {
    let (page, button, _) = page();
    let mut recorder = Recorder::for_page(page.clone(), RecorderConfig::default());
    let (gone, a) = collector();
    let (kept, b) = collector();
    recorder.subscribe(a.clone());
    recorder.subscribe(b);
    recorder.unsubscribe(&a);
    recorder.unsubscribe(&a);

    recorder.start().unwrap();
    page.click(button).unwrap();
    assert!(gone.lock().is_empty());
    assert_eq!(kept.lock().len(), 1);
}

#[test]
fn failing_subscriber_surfaces_from_dispatch() {
    let (page, button, _) = page();
    let mut recorder = Recorder::for_page(page.clone(), RecorderConfig::default());
    let (after, late) = collector();
    recorder.subscribe(subscriber(|_| anyhow::bail!("export quota exceeded")));
    recorder.subscribe(late);
    recorder.start().unwrap();

    let err = page.click(button).unwrap_err();
    assert_eq!(err.code, ErrorCode::SubscriberFailed);
    assert!(err.message.contains("export quota exceeded"));
    assert!(after.lock().is_empty());
    assert_eq!(recorder.steps().len(), 1);
}

#[test]
fn stream_receives_steps_until_stop() {
    let (page, button, _) = page();
    let mut recorder = Recorder::for_page(page.clone(), RecorderConfig::default());
    let stream = recorder.stream(16);
    recorder.start().unwrap();

    page.click(button).unwrap();
    page.wheel(0.0, 1.0).unwrap();
    recorder.stop();

    let received: Vec<Step> = stream.collect();
    assert_eq!(received, vec![Step::click(button, "button#go"), Step::scroll(0.0, 1.0)]);
}

#[test]
fn overlay_follows_listener_lifecycle() {
    let (page, button, _) = page();
    page.document_mut()
        .set_rect(button, Rect::new(4.0, 8.0, 120.0, 32.0))
        .unwrap();
    let config = RecorderConfig::new().mouse_over_style([("outline", "2px solid red")]);
    let mut recorder = Recorder::for_page(page.clone(), config);

    assert!(page.document().get_element_by_id(CONTAINER_ID).is_none());
    recorder.start().unwrap();
    assert!(page.document().get_element_by_id(CONTAINER_ID).is_some());
    assert_eq!(page.listener_count(EventKind::Mouseover), 1);
    page.mouse_over(button).unwrap();

    recorder.pause();
    assert!(page.document().get_element_by_id(CONTAINER_ID).is_none());
    assert_eq!(page.listener_count(EventKind::Mouseover), 0);

    recorder.resume().unwrap();
    assert!(page.document().get_element_by_id(CONTAINER_ID).is_some());

    recorder.stop();
    assert!(page.document().get_element_by_id(CONTAINER_ID).is_none());
    assert_eq!(page.listener_count(EventKind::Mouseout), 0);
}

#[test]
fn overlay_needs_both_flag_and_style() {
    let (page, _, _) = page();
    let config = RecorderConfig::from_json(r#"{"enableMouseOverStyle": true}"#).unwrap();
    let mut recorder = Recorder::for_page(page.clone(), config);
    recorder.start().unwrap();
    assert!(page.document().get_element_by_id(CONTAINER_ID).is_none());
    assert_eq!(page.listener_count(EventKind::Mouseover), 0);
}

#[test]
fn recorder_works_on_a_plain_event_target() {
    let (page, button, _) = page();
    let target: Arc<dyn stepcorder_core::EventTarget> = page.clone();
    let mut recorder = Recorder::new(target, RecorderConfig::default());
    recorder.start().unwrap();
    page.click(button).unwrap();
    assert_eq!(recorder.steps(), vec![Step::click(button, "button#go")]);
}

fn escape_handler(recorder: &Arc<Mutex<Recorder>>, stop: bool) -> Subscriber {
    let handle = Arc::downgrade(recorder);
    subscriber(move |step| {
        let escape = matches!(step, Step::Keydown(k) if k.key == "Escape");
        if let (true, Some(recorder)) = (escape, handle.upgrade()) {
            let mut recorder = recorder.lock();
            if stop {
                recorder.stop();
            } else {
                recorder.pause();
            }
        }
        Ok(())
    })
}

#[test]
fn escape_pauses_from_inside_a_subscriber_with_overlay() {
    let (page, button, _) = page();
    let config = RecorderConfig::new().mouse_over_style([("outline", "1px dashed blue")]);
    let recorder = Arc::new(Mutex::new(Recorder::for_page(page.clone(), config)));
    let (seen, sub) = collector();
    recorder.lock().subscribe(escape_handler(&recorder, false));
    recorder.lock().subscribe(sub);
    recorder.lock().start().unwrap();

    page.key_down(button, "Escape").unwrap();

    assert_eq!(recorder.lock().state(), RecorderState::Paused);
    assert!(page.document().get_element_by_id(CONTAINER_ID).is_none());
    assert_eq!(page.listener_count(EventKind::Mouseover), 0);
    assert_eq!(page.listener_count(EventKind::Keydown), 0);
    assert_eq!(*seen.lock(), vec![Step::keydown(button, "button#go", "Escape")]);

    page.click(button).unwrap();
    assert_eq!(seen.lock().len(), 1);

    recorder.lock().resume().unwrap();
    assert!(page.document().get_element_by_id(CONTAINER_ID).is_some());
    page.click(button).unwrap();
    assert_eq!(seen.lock().len(), 2);
}

#[test]
fn stop_from_inside_a_subscriber_with_overlay() {
    let (page, button, _) = page();
    let config = RecorderConfig::new().mouse_over_style([("outline", "1px dashed blue")]);
    let recorder = Arc::new(Mutex::new(Recorder::for_page(page.clone(), config)));
    recorder.lock().subscribe(escape_handler(&recorder, true));
    recorder.lock().start().unwrap();

    page.key_down(button, "Escape").unwrap();

    let recorder = recorder.lock();
    assert_eq!(recorder.state(), RecorderState::Stopped);
    assert!(recorder.steps().is_empty());
    assert!(page.document().get_element_by_id(CONTAINER_ID).is_none());
    assert_eq!(page.listener_count(EventKind::Mouseout), 0);
}
