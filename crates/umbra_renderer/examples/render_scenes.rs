//! Demo scenes for the Umbra path tracer.
//!
//! Usage: `render_scenes [bouncing|checker|earth|marble|cornell] [config.json]`
//!
//! Writes `<scene>.ppm` and `<scene>.png` to the working directory.

use std::time::Instant;

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use umbra_renderer::{
    make_box, render_parallel, rotate_y, translate, Camera, Color, Material, Mat4, Perlin, Primitive, Quad,
    RenderConfig, Scene, Sphere, Texture, Vec3,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "bouncing".to_string());
    let mut config = match args.next() {
        Some(path) => RenderConfig::from_json_file(&path).with_context(|| format!("reading {}", path))?,
        None => RenderConfig::default(),
    };

    let start = Instant::now();
    let (mut scene, mut camera) = match name.as_str() {
        "bouncing" => bouncing_balls()?,
        "checker" => checkered_spheres()?,
        "earth" => earth()?,
        "marble" => marble_spheres()?,
        "cornell" => {
            // Lit only by its ceiling lamp
            config.background = Color::ZERO;
            cornell_box()?
        }
        other => bail!("unknown scene '{}'", other),
    };
    scene.build_bvh();
    camera.initialize();
    log::info!("Scene '{}' built in {:?}", name, start.elapsed());

    let start = Instant::now();
    let image = render_parallel(&camera, &scene, &config);
    log::info!("Rendered in {:?}", start.elapsed());

    let ppm = format!("{}.ppm", name);
    image.save_ppm(&ppm).with_context(|| format!("writing {}", ppm))?;
    let png = format!("{}.png", name);
    image.save_png(&png).with_context(|| format!("writing {}", png))?;
    log::info!("Saved {} and {}", ppm, png);

    Ok(())
}

fn random_color(rng: &mut StdRng, min: f32, max: f32) -> Color {
    Color::new(rng.gen_range(min..max), rng.gen_range(min..max), rng.gen_range(min..max))
}

/// Ground sphere, a field of small moving and static spheres, three large ones.
fn bouncing_balls() -> Result<(Scene, Camera)> {
    let mut scene = Scene::new();
    let mut rng = StdRng::seed_from_u64(7);

    let ground = scene.add_material(Material::lambertian(Color::splat(0.5)));
    scene.add(Primitive::new(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0), ground))?;

    let big = [Vec3::new(-6.0, 1.0, 0.0), Vec3::new(-1.0, 1.0, 0.0), Vec3::new(4.0, 1.0, 0.0)];
    let radius = 0.2;

    for a in -11..11 {
        for b in -11..11 {
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                radius,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );
            if big.iter().any(|c| (center - Vec3::new(c.x, radius, c.z)).length() <= 0.9) {
                continue;
            }

            let choice: f32 = rng.gen();
            if choice < 0.6 {
                let albedo = random_color(&mut rng, 0.0, 1.0) * random_color(&mut rng, 0.0, 1.0);
                let material = scene.add_material(Material::lambertian(albedo));
                let center1 = center + Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
                scene.add(Primitive::new(Sphere::moving(center, center1, radius), material))?;
            } else if choice < 0.9 {
                let base = random_color(&mut rng, 0.5, 1.0);
                let alpha = rng.gen_range(0.0..0.5);
                let material = scene.add_material(Material::conductor(base, alpha, alpha, 1.0));
                scene.add(Primitive::new(Sphere::new(center, radius), material))?;
            } else {
                let material = scene.add_material(Material::dielectric(1.5));
                scene.add(Primitive::new(Sphere::new(center, radius), material))?;
            }
        }
    }

    let diffuse = scene.add_material(Material::lambertian(Color::new(0.4, 0.2, 0.1)));
    let glass = scene.add_material(Material::dielectric(1.5));
    let metal = scene.add_material(Material::conductor(Color::new(0.7, 0.6, 0.5), 0.0, 0.0, 1.0));
    scene.add(Primitive::new(Sphere::new(big[0], 1.0), diffuse))?;
    scene.add(Primitive::new(Sphere::new(big[1], 1.0), glass))?;
    scene.add(Primitive::new(Sphere::new(big[2], 1.0), metal))?;

    let camera = Camera::new()
        .with_resolution(512, 1)
        .with_aspect_ratio(16.0 / 9.0)
        .with_position(Vec3::new(12.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 9.0);

    Ok((scene, camera))
}

fn sky_camera(from: Vec3) -> Camera {
    Camera::new()
        .with_resolution(512, 1)
        .with_aspect_ratio(16.0 / 9.0)
        .with_position(from, Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.0, 10.0)
}

fn checkered_spheres() -> Result<(Scene, Camera)> {
    let mut scene = Scene::new();
    let checker = Texture::checker_colors(0.32, Color::new(0.2, 0.3, 0.1), Color::splat(0.9));
    let material = scene.add_material(Material::lambertian_texture(checker));

    scene.add(Primitive::new(Sphere::new(Vec3::new(0.0, -10.0, 0.0), 10.0), material))?;
    scene.add(Primitive::new(Sphere::new(Vec3::new(0.0, 10.0, 0.0), 10.0), material))?;

    Ok((scene, sky_camera(Vec3::new(13.0, 2.0, 3.0))))
}

fn earth() -> Result<(Scene, Camera)> {
    let mut scene = Scene::new();
    let surface = scene.add_material(Material::lambertian_texture(Texture::image("earthmap.jpg")));
    scene.add(Primitive::new(Sphere::new(Vec3::ZERO, 2.0), surface))?;

    Ok((scene, sky_camera(Vec3::new(-3.0, 4.0, -12.0))))
}

fn marble_spheres() -> Result<(Scene, Camera)> {
    let mut scene = Scene::new();
    let mut rng = StdRng::seed_from_u64(11);
    let marble = scene.add_material(Material::lambertian_texture(Texture::noise(4.0, Perlin::new(&mut rng))));
    let gold = scene.add_material(Material::conductor(Color::new(1.0, 0.78, 0.34), 0.25, 0.05, 1.0));

    scene.add(Primitive::new(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0), marble))?;
    scene.add(Primitive::new(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0), gold))?;

    Ok((scene, sky_camera(Vec3::new(13.0, 2.0, 3.0))))
}

/// Cornell box with a rough metal block and a glass sphere.
fn cornell_box() -> Result<(Scene, Camera)> {
    let mut scene = Scene::new();
    let red = scene.add_material(Material::lambertian(Color::new(0.65, 0.05, 0.05)));
    let white = scene.add_material(Material::lambertian(Color::splat(0.73)));
    let green = scene.add_material(Material::lambertian(Color::new(0.12, 0.45, 0.15)));
    let light = scene.add_material(Material::emissive(Color::splat(15.0)));
    let aluminium = scene.add_material(Material::conductor(Color::new(0.91, 0.92, 0.92), 0.2, 0.2, 1.0));
    let glass = scene.add_material(Material::rough_dielectric(1.5, 0.05, 0.05));

    let walls = [
        (Quad::new(Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 555.0, 0.0), Vec3::new(0.0, 0.0, 555.0)), green),
        (Quad::new(Vec3::ZERO, Vec3::new(0.0, 555.0, 0.0), Vec3::new(0.0, 0.0, 555.0)), red),
        (Quad::new(Vec3::ZERO, Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 555.0)), white),
        (Quad::new(Vec3::splat(555.0), Vec3::new(-555.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -555.0)), white),
        (Quad::new(Vec3::new(0.0, 0.0, 555.0), Vec3::new(555.0, 0.0, 0.0), Vec3::new(0.0, 555.0, 0.0)), white),
    ];
    for (quad, material) in walls {
        scene.add(Primitive::new(quad, material))?;
    }

    // Ceiling lamp, emitting downwards only
    let lamp = Quad::with_normal(
        Vec3::new(213.0, 554.0, 227.0),
        Vec3::new(130.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 105.0),
        -Vec3::Y,
        &Mat4::IDENTITY,
    );
    scene.add(Primitive::new(lamp, light))?;

    let placement = translate(Vec3::new(265.0, 0.0, 295.0)) * rotate_y(15.0);
    scene.add_all(make_box(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0), &placement), aluminium)?;
    scene.add(Primitive::new(Sphere::new(Vec3::new(190.0, 90.0, 190.0), 90.0), glass))?;

    let camera = Camera::new()
        .with_resolution(600, 600)
        .with_position(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 10.0);

    Ok((scene, camera))
}
