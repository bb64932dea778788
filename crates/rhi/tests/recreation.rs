//! Swap chain recreation decisions, evaluated from surface capabilities alone.

use ash::vk;
use vkframe_rhi::RhiError;
use vkframe_rhi::render_pass::AttachmentFormats;
use vkframe_rhi::swapchain::{RecreatePlan, SwapchainSettings, SwapchainSupport, plan_recreate};

const DEPTH: vk::Format = vk::Format::D32_SFLOAT;

fn extent(width: u32, height: u32) -> vk::Extent2D {
    vk::Extent2D { width, height }
}

fn support(current_extent: vk::Extent2D, color: vk::Format) -> SwapchainSupport {
    SwapchainSupport {
        capabilities: vk::SurfaceCapabilitiesKHR {
            current_extent,
            min_image_extent: extent(0, 0),
            max_image_extent: extent(4096, 4096),
            min_image_count: 2,
            max_image_count: 3,
            ..Default::default()
        },
        formats: vec![vk::SurfaceFormatKHR {
            format: color,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }],
        present_modes: vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX],
    }
}

/// Settings and attachment formats of a swap chain built for `window`.
fn initial(window: vk::Extent2D) -> (SwapchainSettings, AttachmentFormats) {
    let settings = SwapchainSettings::choose(
        &support(window, vk::Format::B8G8R8A8_SRGB),
        window,
        vk::PresentModeKHR::MAILBOX,
    );
    let formats = AttachmentFormats {
        color: settings.surface_format.format,
        depth: DEPTH,
    };
    (settings, formats)
}

#[test]
fn test_unchanged_extent_keeps_image_count_and_render_pass() {
    let window = extent(800, 600);
    let (before, current) = initial(window);

    let plan = plan_recreate(
        &support(window, vk::Format::B8G8R8A8_SRGB),
        window,
        vk::PresentModeKHR::MAILBOX,
        current,
        DEPTH,
    )
    .unwrap();

    let RecreatePlan::Rebuild {
        settings,
        formats,
        render_pass_rebuilt,
    } = plan
    else {
        panic!("unchanged extent must rebuild, got {plan:?}");
    };
    assert_eq!(settings, before);
    assert_eq!(settings.image_count, 3);
    assert_eq!(formats, current);
    assert!(!render_pass_rebuilt);
}

#[test]
fn test_resize_changes_extent_only() {
    let (before, current) = initial(extent(800, 600));
    let large = extent(1280, 720);

    let plan = plan_recreate(
        &support(large, vk::Format::B8G8R8A8_SRGB),
        large,
        vk::PresentModeKHR::MAILBOX,
        current,
        DEPTH,
    )
    .unwrap();

    match plan {
        RecreatePlan::Rebuild {
            settings,
            render_pass_rebuilt,
            ..
        } => {
            assert_eq!(settings.extent, large);
            assert_eq!(settings.image_count, before.image_count);
            assert!(!render_pass_rebuilt);
        }
        RecreatePlan::Suspend => panic!("non-zero extent must not suspend"),
    }
}

#[test]
fn test_zero_extent_suspends_without_teardown() {
    let (_, current) = initial(extent(800, 600));
    let zero = extent(0, 0);

    let plan = plan_recreate(
        &support(zero, vk::Format::B8G8R8A8_SRGB),
        zero,
        vk::PresentModeKHR::MAILBOX,
        current,
        DEPTH,
    )
    .unwrap();
    assert_eq!(plan, RecreatePlan::Suspend);

    // Once the window is restored the same render pass is still usable.
    let restored = extent(800, 600);
    let plan = plan_recreate(
        &support(restored, vk::Format::B8G8R8A8_SRGB),
        restored,
        vk::PresentModeKHR::MAILBOX,
        current,
        DEPTH,
    )
    .unwrap();
    assert!(matches!(
        plan,
        RecreatePlan::Rebuild {
            render_pass_rebuilt: false,
            ..
        }
    ));
}

#[test]
fn test_surface_format_change_replaces_render_pass() {
    let window = extent(800, 600);
    let (_, current) = initial(window);

    let plan = plan_recreate(
        &support(window, vk::Format::R8G8B8A8_UNORM),
        window,
        vk::PresentModeKHR::MAILBOX,
        current,
        DEPTH,
    )
    .unwrap();

    let RecreatePlan::Rebuild {
        formats,
        render_pass_rebuilt,
        ..
    } = plan
    else {
        panic!("expected a rebuild, got {plan:?}");
    };
    assert!(render_pass_rebuilt);
    assert_eq!(formats.color, vk::Format::R8G8B8A8_UNORM);
}

#[test]
fn test_surface_without_formats_is_an_error_not_a_panic() {
    let window = extent(800, 600);
    let (_, current) = initial(window);
    let mut empty = support(window, vk::Format::B8G8R8A8_SRGB);
    empty.formats.clear();

    let result = plan_recreate(&empty, window, vk::PresentModeKHR::FIFO, current, DEPTH);
    assert!(matches!(result, Err(RhiError::Swapchain(_))));
}
