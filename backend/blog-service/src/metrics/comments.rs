use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Comment read-modify-write attempts by action (add/delete) and result.
    pub static ref COMMENT_MUTATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_comment_mutations_total",
        "Comment mutations segmented by action and result",
        &["action", "result"]
    )
    .expect("failed to register blog_comment_mutations_total");
}
