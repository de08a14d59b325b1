pub mod compare;
pub mod scenarios;
pub mod simulate;

use serde_json::Value;

const TRIAL_SERIES: [&str; 4] = ["npvs", "rois", "paybacks", "peak_adoptions"];

/// Prepare one serialised `AggregatedResult` for display: either drop the
/// per-trial series, or replace the tagged paybacks with display codes.
pub(crate) fn present_result(result: &mut Value, paybacks_display: Vec<u32>, summary: bool) {
    let Some(map) = result.as_object_mut() else {
        return;
    };
    if summary {
        for key in TRIAL_SERIES {
            map.remove(key);
        }
    } else {
        map.insert("paybacks".into(), Value::from(paybacks_display));
    }
}
