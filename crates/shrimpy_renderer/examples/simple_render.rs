//! Simple progressive render example.
//!
//! Builds a small scene in code (diffuse, mirror, glass and a glowing fog
//! ball), accumulates a handful of frames and saves the result as PPM, then
//! walks the camera closer and renders a second view.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shrimpy_core::{Camera, FrameUniforms, Material, Scene, Sphere, Triangle};
use shrimpy_renderer::{render_frame, AccumulationBuffer, DisplayImage, RenderConfig};
use shrimpy_math::Vec3;
use std::fs::File;
use std::io::{BufWriter, Write};

const FRAMES: u32 = 32;

fn main() {
    println!("Shrimpy Path Tracer - Simple Example");
    println!("====================================");

    let start = std::time::Instant::now();
    let scene = build_scene().expect("Failed to build scene");
    println!(
        "Scene built in {:?}: {} spheres, {} triangles",
        start.elapsed(),
        scene.sphere_count(),
        scene.triangle_count()
    );

    let camera = Camera::new()
        .looking_at(Vec3::new(0.0, 2.0, -9.0), Vec3::new(0.0, 0.8, 0.0))
        .with_lens(40.0, 9.0, 0.08)
        .with_max_bounces(12);
    let mut uniforms = FrameUniforms::new(camera, 400, 225);
    let config = RenderConfig::default();

    let mut previous = AccumulationBuffer::new(uniforms.width, uniforms.height);
    let mut current = AccumulationBuffer::new(uniforms.width, uniforms.height);

    for (view, filename) in ["output.ppm", "output_closeup.ppm"].into_iter().enumerate() {
        if view > 0 {
            // Step in toward the fog ball; moving the camera restarts accumulation.
            uniforms.camera.move_forward(4.0);
            uniforms.camera.move_right(0.3);
            uniforms.camera.move_up(-0.6);
            uniforms.camera.pan(-0.05);
            uniforms.camera.tilt(-0.1);
            uniforms.camera.focus_distance = 3.5;
            uniforms.reset();
        }

        println!("Rendering {}x{} for {} frames...", uniforms.width, uniforms.height, FRAMES);

        let start = std::time::Instant::now();
        let mut image = DisplayImage::new(uniforms.width, uniforms.height);
        for frame in 0..FRAMES {
            uniforms.advance(frame as f32 / 60.0);
            image = render_frame(&scene, &uniforms, &config, &previous, &mut current);
            std::mem::swap(&mut previous, &mut current);
        }
        println!("Rendered in {:?}", start.elapsed());

        save_ppm(&image, filename).expect("Failed to save image");
        println!("Saved to {}", filename);
    }
}

fn build_scene() -> shrimpy_core::SceneResult<Scene> {
    let mut scene = Scene::new();

    let ground = scene.add_material(Material::diffuse(Vec3::splat(0.5), 1.0))?;
    let glass = scene.add_material(Material::dielectric(Vec3::ONE, 1.5))?;
    let clay = scene.add_material(Material::diffuse(Vec3::new(0.4, 0.2, 0.1), 1.0))?;
    let mirror = scene.add_material(Material::diffuse(Vec3::new(0.7, 0.6, 0.5), 0.0))?;
    let fog = scene.add_material(
        Material::diffuse(Vec3::ONE, 1.0)
            .with_volume_density(0.6)
            .with_emission(0.8),
    )?;

    // Ground quad
    let corners = [
        Vec3::new(-20.0, 0.0, -20.0),
        Vec3::new(20.0, 0.0, -20.0),
        Vec3::new(20.0, 0.0, 20.0),
        Vec3::new(-20.0, 0.0, 20.0),
    ];
    scene.add_triangle(Triangle::new([corners[0], corners[2], corners[1]], ground))?;
    scene.add_triangle(Triangle::new([corners[0], corners[3], corners[2]], ground))?;

    // Three main spheres
    scene.add_sphere(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass))?;
    scene.add_sphere(Sphere::new(Vec3::new(-2.5, 1.0, 0.0), 1.0, clay))?;
    scene.add_sphere(Sphere::new(Vec3::new(2.5, 1.0, 0.0), 1.0, mirror))?;
    scene.add_sphere(Sphere::new(Vec3::new(0.0, 0.6, -2.5), 0.6, fog))?;

    // Small random spheres
    let mut rng = StdRng::seed_from_u64(2024);
    for a in -3..3 {
        for b in -3..3 {
            let center = Vec3::new(
                a as f32 * 1.3 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 * 1.3 + 2.0 + 0.9 * rng.gen::<f32>(),
            );

            let choose_mat: f32 = rng.gen();
            let material = if choose_mat < 0.8 {
                let albedo = Vec3::new(rng.gen(), rng.gen(), rng.gen()) * Vec3::new(rng.gen(), rng.gen(), rng.gen());
                Material::diffuse(albedo, 1.0)
            } else if choose_mat < 0.95 {
                let albedo = Vec3::splat(0.5) + 0.5 * Vec3::new(rng.gen(), rng.gen(), rng.gen());
                Material::diffuse(albedo, 0.5 * rng.gen::<f32>())
            } else {
                Material::dielectric(Vec3::ONE, 1.5)
            };

            let id = scene.add_material(material)?;
            scene.add_sphere(Sphere::new(center, 0.2, id))?;
        }
    }

    scene.build_bvh()?;
    Ok(scene)
}

fn save_ppm(image: &DisplayImage, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for rgba in image.to_rgba().chunks_exact(4) {
        writeln!(writer, "{} {} {}", rgba[0], rgba[1], rgba[2])?;
    }

    Ok(())
}
