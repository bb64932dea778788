//! Contract checks that must fail before any device call.

use ash::vk::{self, Handle};
use vkframe_rhi::RhiError;
use vkframe_rhi::descriptor::{PoolBudget, check_unique_bindings};
use vkframe_rhi::pipeline::{PipelineConfig, ViewportPolicy};

#[test]
fn test_pipeline_with_null_render_pass_is_rejected() {
    let mut config = PipelineConfig::default_config(ViewportPolicy::Dynamic);
    config.pipeline_layout = Some(vk::PipelineLayout::from_raw(0x10));
    config.render_pass = Some(vk::RenderPass::null());

    assert!(matches!(config.validate(), Err(RhiError::MissingRenderPass)));
}

#[test]
fn test_pipeline_without_layout_is_rejected() {
    let mut config = PipelineConfig::default_config(ViewportPolicy::Dynamic);
    config.render_pass = Some(vk::RenderPass::from_raw(0x20));

    assert!(matches!(
        config.validate(),
        Err(RhiError::MissingPipelineLayout)
    ));
}

#[test]
fn test_pool_capacity_is_exact() {
    let mut budget = PoolBudget::new(2);
    for _ in 0..2 {
        budget.try_allocate(1).unwrap();
    }
    match budget.try_allocate(1) {
        Err(RhiError::PoolExhausted { max_sets }) => assert_eq!(max_sets, 2),
        other => panic!("expected pool exhaustion, got {other:?}"),
    }
}

#[test]
fn test_duplicate_descriptor_slot_is_rejected() {
    assert!(matches!(
        check_unique_bindings([0, 0]),
        Err(RhiError::DuplicateBinding(0))
    ));
}
