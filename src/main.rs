// src/main.rs

mod app;
mod ui;

use std::process::ExitCode;
use std::sync::Arc;

use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    window::WindowBuilder,
};

use app::SnowApp;
use snowscape::{Result, SceneConfig, SceneError};

async fn run() -> Result<()> {
    let config = SceneConfig::load()?;

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window.title.as_str())
            .with_inner_size(winit::dpi::PhysicalSize::new(config.window.width, config.window.height))
            .build(&event_loop)?,
    );

    let mut app_state = SnowApp::new(window.clone(), &config).await?;
    let mut last_time = std::time::Instant::now();
    let mut fatal: Option<SceneError> = None;

    event_loop
        .run(|event, target: &EventLoopWindowTarget<()>| {
            target.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { ref event, window_id } if window_id == window.id() => {
                    if !app_state.handle_window_event(event, &window) {
                        match event {
                            WindowEvent::CloseRequested => target.exit(),
                            WindowEvent::Resized(physical_size) => app_state.resize(*physical_size),
                            WindowEvent::RedrawRequested => { /* In AboutToWait */ }
                            _ => {}
                        }
                    }
                }
                Event::DeviceEvent { event: device_event, .. } => {
                    app_state.handle_device_event(&device_event);
                }
                Event::AboutToWait => {
                    let now = std::time::Instant::now();
                    let elapsed = (now - last_time).as_secs_f64();
                    last_time = now;

                    app_state.update(elapsed);
                    if app_state.exit_requested() {
                        target.exit();
                        return;
                    }
                    match app_state.render(&window) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => {
                            if let Err(e) = app_state.recover_lost_device() {
                                log::error!("Could not restore device resources: {e}");
                                fatal = Some(e);
                                target.exit();
                            }
                        }
                        Err(wgpu::SurfaceError::Outdated) => app_state.resize(app_state.get_size()),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("WGPU Out Of Memory! Exiting.");
                            target.exit();
                        }
                        Err(e) => log::warn!("Surface error: {e:?}"),
                    }

                    if !target.exiting() {
                        window.request_redraw();
                    }
                }
                _ => {}
            }
        })?;

    fatal.map_or(Ok(()), Err)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
