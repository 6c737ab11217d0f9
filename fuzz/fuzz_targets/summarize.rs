#![no_main]

use libfuzzer_sys::fuzz_target;
use uibench_domain::summarize;

fuzz_target!(|samples: Vec<f64>| {
    let Ok(s) = summarize(&samples) else {
        assert!(samples.is_empty());
        return;
    };
    assert_eq!(s.count, samples.len());
    if samples.iter().all(|v| v.is_finite() && v.abs() < 1e100) {
        assert!(s.min <= s.median && s.median <= s.max);
        assert!(s.min <= s.mean && s.mean <= s.max);
    }
});
