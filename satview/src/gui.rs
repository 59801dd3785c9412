use kiss3d::{
    event::{Action, Key, WindowEvent},
    nalgebra::{Point2, Point3},
    scene::PlanarSceneNode,
    text::Font,
    window::Window,
};
use std::{path::Path, rc::Rc};
use tracing::{info, warn};
use tracktypes::prelude::Lla;

use crate::{
    app::AppState,
    map::{self, AngleUnit, MapProjection},
    viewer::UserCommand,
};

pub const INFO_TEXT_SCALE: f32 = 36.0;
pub const STATUS_TEXT_SCALE: f32 = 28.0;
pub const MAP_MARGIN: f64 = 20.0;
pub const MARKER_HALF_SIZE: f64 = 6.0;
pub const GRATICULE_STEP_DEG: f64 = 30.0;
pub const SNAPSHOT_PATH: &str = "snapshot.png";

const BACKGROUND_RGB: [f32; 3] = [0.05, 0.07, 0.12];
const OUTLINE_RGB: [f32; 3] = [0.6, 0.6, 0.6];
const GRATICULE_RGB: [f32; 3] = [0.25, 0.3, 0.35];
const TRACK_RGB: [f32; 3] = [1.0, 0.85, 0.0];
const MARKER_RGB: [f32; 3] = [1.0, 0.0, 0.0];

pub struct GuiState {
    window: Window,
    font: Rc<Font>,
    text_color: Point3<f32>,

    background: Option<PlanarSceneNode>,
    projection: MapProjection,

    info_visibility: bool,
    graticule_visibility: bool,
}

impl GuiState {
    pub fn new(win_title: &str, background: Option<&Path>, graticule_visibility: bool) -> Self {
        let mut window = Window::new(win_title);
        window.set_background_color(BACKGROUND_RGB[0], BACKGROUND_RGB[1], BACKGROUND_RGB[2]);
        window.set_framerate_limit(Some(30));

        let background = background.filter(|p| is_decodable_image(p)).map(|path| {
            // Unit rectangle, scaled to the map size every frame
            let mut n = window.add_rectangle(1.0, 1.0);
            n.set_texture_from_file(path, "world-map");
            n
        });

        println!("----------------------------------------------");
        println!("|                 GUI key map                |");
        println!("----------------------------------------------");
        println!("RIGHT : select next satellite");
        println!("LEFT  : select previous satellite");
        println!("'c'   : switch to the next category and refresh");
        println!("'u'   : update the current satellites");
        println!("'r'   : refresh now");
        println!("'t'   : toggle ground track visibility");
        println!("'i'   : toggle satellite info visibility");
        println!("'g'   : toggle graticule visibility");
        println!("'p'   : snapshot : writes {SNAPSHOT_PATH} to the CWD");
        println!("ESC   : exit");
        println!("----------------------------------------------");

        Self {
            window,
            font: Font::default(),
            text_color: Point3::new(1.0, 1.0, 1.0),
            background,
            projection: MapProjection::new(0.0, 0.0),
            info_visibility: true,
            graticule_visibility,
        }
    }

    /// Fit the map to the current window size
    fn update_projection(&mut self) {
        let size = self.window.size();
        let scale = self.window.scale_factor();
        self.projection = MapProjection::fit(
            size.x as f64 / scale,
            size.y as f64 / scale,
            MAP_MARGIN,
        );

        if let Some(n) = self.background.as_mut() {
            n.set_local_scale(self.projection.width as f32, self.projection.height as f32);
        }
    }

    fn draw_line(&mut self, a: na::Point2<f64>, b: na::Point2<f64>, rgb: [f32; 3]) {
        self.window
            .draw_planar_line(&to_point(a), &to_point(b), &Point3::from(rgb));
    }

    fn draw_outline(&mut self) {
        let hw = self.projection.width / 2.0;
        let hh = self.projection.height / 2.0;
        let corners = [
            na::Point2::new(-hw, -hh),
            na::Point2::new(hw, -hh),
            na::Point2::new(hw, hh),
            na::Point2::new(-hw, hh),
        ];
        for i in 0..corners.len() {
            self.draw_line(corners[i], corners[(i + 1) % corners.len()], OUTLINE_RGB);
        }
    }

    fn draw_graticule(&mut self) {
        for (a, b) in self.projection.graticule(GRATICULE_STEP_DEG) {
            self.draw_line(a, b, GRATICULE_RGB);
        }
    }

    fn draw_ground_track(&mut self, trajectory: &[Lla], unit: AngleUnit) {
        let track: Vec<Lla> = trajectory.iter().map(|p| unit.to_degrees(*p)).collect();
        for segment in map::ground_track_segments(&track) {
            for pair in segment.windows(2) {
                let a = self.projection.project(&pair[0]);
                let b = self.projection.project(&pair[1]);
                self.draw_line(a, b, TRACK_RGB);
            }
        }
    }

    fn draw_marker(&mut self, lla: &Lla) {
        let p = self.projection.project(lla);
        for (a, b) in map::marker_lines(p, MARKER_HALF_SIZE) {
            self.draw_line(a, b, MARKER_RGB);
        }
    }

    /// Draw the selected satellite's info text in the top left corner
    fn draw_info(&mut self, app: &AppState) {
        let mut origin = Point2::origin();
        for line in app.info_lines() {
            self.window
                .draw_text(&line, &origin, INFO_TEXT_SCALE, &self.font, &self.text_color);
            origin.y += INFO_TEXT_SCALE;
        }
    }

    /// Draw the mode and refresh status along the bottom edge
    fn draw_status(&mut self, app: &AppState) {
        let status = app.status_line();
        let origin = Point2::new(0.0, self.window.size().y as f32 - STATUS_TEXT_SCALE);
        self.window.draw_text(
            &status,
            &origin,
            STATUS_TEXT_SCALE,
            &self.font,
            &self.text_color,
        );
    }

    fn snapshot(&mut self) {
        let img = self.window.snap_image();
        let img_path = Path::new(SNAPSHOT_PATH);
        info!(path = %img_path.display(), "Writing snapshot");
        if let Err(e) = img.save(img_path) {
            warn!(error = %e, "Failed to write snapshot");
        }
    }

    /// Draw one frame and collect the user's commands.
    /// Returns false if the window should be closed
    pub fn render(&mut self, app: &AppState, commands: &mut Vec<UserCommand>) -> bool {
        self.update_projection();

        if self.graticule_visibility {
            self.draw_graticule();
        }
        self.draw_outline();

        if let Some(rec) = app.selected_record() {
            if app.show_trajectory {
                self.draw_ground_track(&rec.trajectory, app.angle_unit);
            }
            if let Some(lla) = rec.lla {
                self.draw_marker(&app.angle_unit.to_degrees(lla));
            }
        }

        if self.info_visibility {
            self.draw_info(app);
        }
        self.draw_status(app);

        let open = self.window.render();

        for event in self.window.events().iter() {
            if let WindowEvent::Key(key, Action::Press, _) = event.value {
                match key {
                    Key::Right => commands.push(UserCommand::NextSatellite),
                    Key::Left => commands.push(UserCommand::PrevSatellite),
                    Key::C => commands.push(UserCommand::NextCategory),
                    Key::U => commands.push(UserCommand::Update),
                    Key::R => commands.push(UserCommand::RefreshNow),
                    Key::T => commands.push(UserCommand::ToggleTrajectory),
                    Key::I => {
                        self.info_visibility = !self.info_visibility;
                    }
                    Key::G => {
                        self.graticule_visibility = !self.graticule_visibility;
                    }
                    Key::P => self.snapshot(),
                    _ => (),
                }
            }
        }

        open
    }
}

fn to_point(p: na::Point2<f64>) -> Point2<f32> {
    Point2::new(p.x as f32, p.y as f32)
}

/// kiss3d panics on images it can't decode, so the background is checked first.
/// Without a usable image the map is drawn without one.
pub fn is_decodable_image(path: &Path) -> bool {
    if !path.is_file() {
        warn!(path = %path.display(), "Map background image not found");
        return false;
    }
    match image::open(path) {
        Ok(_) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Map background is not a usable image");
            false
        }
    }
}
