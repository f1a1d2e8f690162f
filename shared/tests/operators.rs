//! Operator chains on synthetic images, as the lab programs use them.

use approx::assert_relative_eq;
use image::Rgb;
use shared::image_proc::{
    canny, cartoonise, gaussian_blur, grey_to_plane, laplacian_u8, median_blur, rgb_to_grey,
    scharr_magnitude, threshold_u8, CartoonParams, ThresholdKind,
};
use test_helpers::{checkerboard, colour_quadrants, horizontal_ramp, output_path, step_edge};

#[test]
fn test_canny_marks_step_once_per_row() {
    let image = step_edge(32, 16, 16, 20, 220);
    let edges = canny(&image, 50.0, 150.0);
    edges.save(output_path("canny_step_edge.png")).unwrap();

    for y in 0..16 {
        let columns: Vec<u32> = (0..32).filter(|&x| edges.get_pixel(x, y)[0] == 255).collect();
        assert_eq!(columns, vec![15], "row {y}");
    }
}

#[test]
fn test_smoothing_keeps_linear_ramp() {
    let ramp = horizontal_ramp(6, 12);
    let blurred = gaussian_blur(&ramp.view(), 3, 0.5).unwrap();
    for x in 1..11 {
        assert_relative_eq!(blurred[[3, x]], x as f32, epsilon = 1e-4);
    }

    let gradient = scharr_magnitude(&blurred.view()).unwrap();
    assert_relative_eq!(gradient[[3, 5]], 16.0, epsilon = 1e-3);
}

#[test]
fn test_median_keeps_checkerboard_cells() {
    let board = checkerboard(16, 16, 4);
    let filtered = median_blur(&board, 3).unwrap();
    assert_eq!(filtered.get_pixel(1, 1)[0], 0);
    assert_eq!(filtered.get_pixel(5, 1)[0], 255);
    assert_eq!(filtered.get_pixel(5, 5)[0], 0);
}

#[test]
fn test_laplacian_outline_mask_on_step() {
    let image = step_edge(24, 8, 12, 0, 200);
    let mask = threshold_u8(&laplacian_u8(&image, 5).unwrap(), 100, 255, ThresholdKind::BinaryInv);
    // Only the dark side of the step has a strong positive response
    assert_eq!(mask.get_pixel(11, 4)[0], 0);
    assert_eq!(mask.get_pixel(12, 4)[0], 255);
    assert_eq!(mask.get_pixel(2, 4)[0], 255);
    assert_eq!(mask.get_pixel(20, 4)[0], 255);
}

#[test]
fn test_cartoon_of_colour_blocks() {
    let frame = colour_quadrants(48, 32);
    let cartoon = cartoonise(&frame, &CartoonParams::default()).unwrap();
    cartoon.save(output_path("cartoon_quadrants.png")).unwrap();

    assert_eq!(cartoon.dimensions(), (48, 32));
    assert_eq!(*cartoon.get_pixel(4, 4), Rgb([220, 30, 30]));
    assert_eq!(*cartoon.get_pixel(44, 28), Rgb([240, 240, 240]));

    let grey = grey_to_plane(&rgb_to_grey(&cartoon));
    let black = grey.iter().filter(|&&v| v == 0.0).count();
    assert!(black > 0 && black < 48 * 32 / 4);
}
