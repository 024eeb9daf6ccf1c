//! TagCortex smoke tests (run with `wasm-pack test --node`)

#![cfg(target_arch = "wasm32")]

use serde::Serialize;
use serde_json::json;
use tagcore::TagCortex;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

fn js(value: serde_json::Value) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap()
}

fn back(value: JsValue) -> serde_json::Value {
    serde_wasm_bindgen::from_value(value).unwrap()
}

fn snapshot(text: &str) -> JsValue {
    js(json!({ "blocks": [{ "id": "p1", "text": text }], "marks": [] }))
}

#[wasm_bindgen_test]
fn test_add_tag_returns_mark_ops() {
    let mut cortex = TagCortex::new(JsValue::UNDEFINED, None);
    cortex.open_document("note-1").unwrap();

    let def = js(json!({ "name": "Greeting", "color": "#F59E0B", "scope": "inline" }));
    let out = back(cortex.add_tag(def, 0, 5, snapshot("hello world")).unwrap());

    assert_eq!(out["result"]["content"], "hello");
    assert_eq!(out["markOps"][0]["op"], "apply");
    assert_eq!(out["markOps"][0]["attrs"]["block_id"], "p1");
}

#[wasm_bindgen_test]
fn test_state_lives_in_host_map() {
    let map = js_sys::Map::new();
    let mut cortex = TagCortex::new(JsValue::UNDEFINED, Some(map.clone()));
    cortex.open_document("note-1").unwrap();
    let def = js(json!({ "name": "Greeting", "scope": "inline" }));
    cortex.add_tag(def, 0, 5, snapshot("hello world")).unwrap();
    cortex.save_state(JsValue::UNDEFINED).unwrap();

    assert!(map.get(&JsValue::from_str("tagcore:note-1")).is_string());
}

#[wasm_bindgen_test]
fn test_change_then_recover() {
    let mut cortex = TagCortex::new(JsValue::UNDEFINED, None);
    cortex.open_document("note-1").unwrap();
    let def = js(json!({ "name": "Greeting", "scope": "inline" }));
    cortex.add_tag(def, 0, 5, snapshot("hello world")).unwrap();

    let change = js(json!({
        "version": 1,
        "steps": [
            { "type": "delete", "start": 0, "end": 6 },
            { "type": "insert", "at": 5, "text": " hello" }
        ]
    }));
    let summary = back(cortex.apply_change(change, snapshot("world hello")).unwrap());
    assert_eq!(summary["invalidated"].as_array().unwrap().len(), 1);

    let ticket = cortex.begin_recovery();
    assert!(!ticket.is_null());
    let out = back(cortex.complete_recovery(ticket, snapshot("world hello")).unwrap());
    assert_eq!(out["result"]["recovered"].as_array().unwrap().len(), 1);
    assert_eq!(out["markOps"][0]["span"]["start"].as_f64(), Some(6.0));
}
