mod common;

use std::sync::atomic::Ordering;

use common::{FakeFactory, init_tracing, rgba, size};
use native_render::engine::config::RenderConfig;
use native_render::engine::effect::Effect;
use native_render::engine::error::RenderError;
use native_render::engine::offscreen::{OffscreenRenderContext, OffscreenState, SUBSCRIPTION_CAPACITY};
use native_render::engine::params::ParamType;

fn context() -> (
    OffscreenRenderContext<FakeFactory>,
    std::sync::Arc<common::HeadlessLog>,
) {
    init_tracing();
    let (factory, log) = FakeFactory::new();
    (OffscreenRenderContext::new(factory, RenderConfig::default()), log)
}

#[test]
fn draw_before_init_is_not_initialized() {
    let (context, _log) = context();
    let err = context.draw().unwrap_err();
    assert!(matches!(err, RenderError::NotInitialized(_)));
    assert_eq!(err.status_code(), -3);
    assert_eq!(context.state(), OffscreenState::Uninitialized);
}

#[test]
fn uninit_before_init_and_twice_is_a_no_op() {
    let (context, log) = context();
    context.uninit();
    context.init().unwrap();
    context.uninit();
    context.uninit();
    assert_eq!(context.state(), OffscreenState::Uninitialized);
    assert_eq!(log.live_backends.load(Ordering::SeqCst), 0);
}

#[test]
fn draw_without_image_yields_nothing() {
    let (context, _log) = context();
    context.init().unwrap();
    assert_eq!(context.state(), OffscreenState::Initialized);
    assert_eq!(context.draw().unwrap(), None);
}

#[test]
fn draw_reads_back_the_latest_image() {
    let (context, log) = context();
    context.init().unwrap();
    context.set_image_data(size(2, 3), &rgba(2, 3, 1)).unwrap();
    context.set_image_data(size(2, 3), &rgba(2, 3, 4)).unwrap();
    assert_eq!(context.state(), OffscreenState::Ready);

    let image = context.draw().unwrap().unwrap();
    assert_eq!(image.size, size(2, 3));
    assert_eq!(image.pixels, rgba(2, 3, 4));

    context.draw().unwrap();
    assert_eq!(log.uploads.load(Ordering::SeqCst), 1);
}

#[test]
fn image_supplied_before_init_is_drawn_after_init() {
    let (context, _log) = context();
    context.set_image_data(size(1, 1), &rgba(1, 1, 3)).unwrap();
    context.init().unwrap();
    let image = context.draw().unwrap().unwrap();
    assert_eq!(image.pixels, rgba(1, 1, 3));
}

#[test]
fn malformed_image_is_rejected() {
    let (context, _log) = context();
    context.init().unwrap();
    assert!(matches!(
        context.set_image_data(size(2, 2), &[0; 3]),
        Err(RenderError::InvalidBuffer(_))
    ));
    assert!(context.set_image_data(size(2, 2), &[]).is_err());
    assert_eq!(context.state(), OffscreenState::Initialized);
}

#[test]
fn int_params_select_the_effect() {
    let (context, log) = context();
    context.init().unwrap();
    context.set_int_params(ParamType::EFFECT, Effect::Edge.index());
    context.set_image_data(size(1, 1), &rgba(1, 1, 0)).unwrap();
    context.draw().unwrap();
    let frame = log.last_frame.lock().clone().unwrap();
    assert_eq!(frame.effect, Effect::Edge);
    assert_eq!(frame.layers.len(), 1);
    assert_eq!(frame.viewport, size(1, 1));
}

#[test]
fn failed_init_can_be_retried() {
    let (context, log) = context();
    *log.fail_next_create.lock() = true;
    let err = context.init().unwrap_err();
    assert!(matches!(err, RenderError::ResourceAllocation(_)));
    assert_eq!(context.state(), OffscreenState::Uninitialized);

    context.init().unwrap();
    assert_eq!(log.live_backends.load(Ordering::SeqCst), 1);
}

#[test]
fn reinit_replaces_the_backend_without_leaking() {
    let (context, log) = context();
    context.init().unwrap();
    context.init().unwrap();
    assert_eq!(log.live_backends.load(Ordering::SeqCst), 1);
    drop(context);
    assert_eq!(log.live_backends.load(Ordering::SeqCst), 0);
}

#[test]
fn uninit_drops_image_and_requires_init() {
    let (context, _log) = context();
    context.init().unwrap();
    context.set_image_data(size(1, 1), &rgba(1, 1, 1)).unwrap();
    context.draw().unwrap();
    context.uninit();
    assert!(matches!(
        context.draw(),
        Err(RenderError::NotInitialized(_))
    ));

    context.init().unwrap();
    assert_eq!(context.draw().unwrap(), None);
}

#[test]
fn subscribers_receive_readbacks_and_full_queues_drop() {
    let (context, _log) = context();
    let rx = context.subscribe();
    let dropped = context.subscribe();
    drop(dropped);

    context.init().unwrap();
    for fill in 0..(SUBSCRIPTION_CAPACITY as u8 + 2) {
        context.set_image_data(size(1, 1), &rgba(1, 1, fill)).unwrap();
        context.draw().unwrap();
    }

    let received: Vec<_> = rx.try_iter().map(|image| image.pixels[0]).collect();
    assert_eq!(received, vec![0, 1]);
}

#[test]
fn clear_color_reaches_the_backend() {
    let (context, log) = context();
    context.set_clear_color([1.0, 0.5, 0.0, 1.0]);
    context.init().unwrap();
    context.set_image_data(size(1, 1), &rgba(1, 1, 2)).unwrap();
    context.draw().unwrap();
    let frame = log.last_frame.lock().clone().unwrap();
    assert_eq!(frame.config.clear_color, [1.0, 0.5, 0.0, 1.0]);
}
