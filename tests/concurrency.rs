mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use common::{RecordingRenderer, init_tracing, size};
use native_render::engine::config::RenderConfig;
use native_render::engine::format::ImageFormat;
use native_render::engine::params::ParamType;
use native_render::engine::slot::{BufferSlot, ChannelIndex};
use native_render::engine::surface::RenderContext;

#[test]
fn snapshots_are_never_torn() {
    let slot: Arc<BufferSlot<Vec<u8>>> = Arc::new(BufferSlot::new());
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let slot = slot.clone();
        let done = done.clone();
        thread::spawn(move || {
            for n in 1..=2_000u32 {
                slot.publish(vec![(n % 251) as u8; 256]);
            }
            done.store(true, Ordering::Release);
        })
    };

    let mut last = 0;
    while !done.load(Ordering::Acquire) {
        if let Some(snapshot) = slot.snapshot_if_newer(last) {
            assert!(snapshot.version > last);
            let first = snapshot.payload[0];
            assert!(snapshot.payload.iter().all(|&b| b == first));
            assert_eq!(first as u64, snapshot.version % 251);
            last = snapshot.version;
        }
    }
    writer.join().unwrap();
    assert_eq!(slot.version(), 2_000);
}

#[test]
fn producers_on_many_channels_with_a_drawing_consumer() {
    init_tracing();
    let (renderer, log) = RecordingRenderer::new();
    let context = Arc::new(RenderContext::new(renderer, RenderConfig::default()));
    context.on_surface_created().unwrap();
    context.on_surface_changed(size(16, 16)).unwrap();

    let producers: Vec<_> = (0..4u32)
        .map(|channel| {
            let inputs = context.inputs();
            thread::spawn(move || {
                for n in 0..200u8 {
                    let bytes = vec![n; 4 * 4];
                    inputs
                        .set_image_data_with_index(
                            ChannelIndex(channel),
                            ImageFormat::Gray,
                            size(4, 4),
                            &bytes,
                        )
                        .unwrap();
                    inputs.set_params_int(ParamType(channel as i32), n as i32, 0);
                }
            })
        })
        .collect();

    while producers.iter().any(|p| !p.is_finished()) {
        context.on_draw_frame().unwrap();
    }
    for producer in producers {
        producer.join().unwrap();
    }
    let stats = context.on_draw_frame().unwrap();
    assert_eq!(stats.layers, 4);

    for channel in 0..4 {
        let uploads = log.uploads_for(ChannelIndex(channel));
        let last = uploads.last().unwrap();
        assert!(last.iter().all(|&b| b == 199));
        assert!(uploads.iter().all(|bytes| bytes.iter().all(|&b| b == bytes[0])));
        assert_eq!(
            context.inputs().params().int(ParamType(channel as i32)),
            199
        );
    }
}
