use std::fs;
use std::path::Path;

fn validate_shader(path: &Path) {
    let src = fs::read_to_string(path).expect("read shader");
    let module = naga::front::wgsl::parse_str(&src).expect("wgsl parse");
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator.validate(&module).expect("wgsl validate");
}

#[test]
fn compile_table_shader() {
    let shader = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/shader.wgsl");
    validate_shader(&shader);
}

#[test]
fn vertex_layout_matches_shader_locations() {
    // Three vec3<f32> attributes, tightly packed
    assert_eq!(std::mem::size_of::<render::Vertex>(), 36);
    // mat4 + two vec4 in the uniform block
    assert_eq!(std::mem::size_of::<render::CameraUniform>(), 96);
}
