use perceptra::matrix;
use perceptra::matrix::Matrix;
use rand::{SeedableRng, rngs::StdRng};

#[test]
fn test_parse_and_literal_agree() {
    let parsed = Matrix::parse("1 2 3 ; 4 5 6 ; 7 8 9").unwrap();
    let literal = matrix!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);

    assert_eq!(parsed.shape(), (3, 3));
    assert_eq!(parsed.get(0, 0), 1.0);
    assert_eq!(parsed.get(2, 1), 8.0);
    assert_eq!(parsed, literal);
}

#[test]
fn test_parse_rejects_bad_text() {
    assert!(Matrix::parse("1 2 ; 3").is_err());
    assert!(Matrix::parse("1 two").is_err());
    assert!(Matrix::parse("").is_err());
}

#[test]
fn test_zero_dimension_panics() {
    let result = std::panic::catch_unwind(|| Matrix::new(0, 3));
    assert!(result.is_err());
}

#[test]
fn test_equality_is_exact() {
    let a = Matrix::parse("1 2 ; 3 4").unwrap();
    let b = Matrix::parse("1 2 ; 3 4").unwrap();
    let c = Matrix::parse("1 2 3 4").unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c); // same entries, different shape
    assert_ne!(a, a.add_scalar(1e-15));
}

#[test]
fn test_transpose() {
    let m = Matrix::parse("1 2 3 ; 4 5 6").unwrap();
    let expected = Matrix::parse("1 4 ; 2 5 ; 3 6").unwrap();

    assert_eq!(expected, m.transpose());
    assert_eq!(m, m.transpose().transpose());
}

#[test]
fn test_multiply() {
    let m1 = Matrix::parse("1 2 3 ; 4 5 6").unwrap();
    let m2 = Matrix::parse("2 4 ; 3 0 ; 1 0").unwrap();

    assert_eq!(Matrix::parse("11 4 ; 29 16").unwrap(), m1.multiply(&m2));
    assert_eq!(
        Matrix::parse("18 24 30 ; 3 6 9 ; 1 2 3").unwrap(),
        m2.multiply(&m1)
    );
}

#[test]
fn test_multiply_shape_and_transpose_identity() {
    let a = Matrix::parse("1 2 ; 3 4 ; 5 6").unwrap(); // 3x2
    let b = Matrix::parse("1 0 1 0 ; 0 1 0 1").unwrap(); // 2x4

    let product = a.multiply(&b);
    assert_eq!(product.shape(), (3, 4));
    // (A·B)ᵗ = Bᵗ·Aᵗ
    assert_eq!(product.transpose(), b.transpose().multiply(&a.transpose()));
}

#[test]
fn test_add_subtract() {
    let m1 = Matrix::parse("1 1 1 ; 1 1 1").unwrap();
    let m2 = Matrix::parse("0 1 0 ; 2 2 2").unwrap();

    assert_eq!(Matrix::parse("1 2 1 ; 3 3 3").unwrap(), m1.add(&m2));
    assert_eq!(Matrix::parse("1 0 1 ; -1 -1 -1").unwrap(), m1.subtract(&m2));
    assert_eq!(Matrix::parse("-1 0 -1 ; 1 1 1").unwrap(), m2.subtract(&m1));
}

#[test]
fn test_scalar_arithmetic() {
    let m = Matrix::parse("0 1 0 ; 2 2 2").unwrap();

    assert_eq!(Matrix::parse("10 11 10 ; 12 12 12").unwrap(), m.add_scalar(10.0));
    assert_eq!(m, m.add_scalar(10.0).subtract_scalar(10.0));
    assert_eq!(Matrix::parse("0 10 0 ; 20 20 20").unwrap(), m.multiply_scalar(10.0));
    assert_eq!(Matrix::parse("0 0.5 0 ; 1 1 1").unwrap(), m.divide_scalar(2.0));
}

#[test]
fn test_hadamard_product_and_quotient() {
    let m1 = Matrix::parse("1 1 1 ; 2 2 2").unwrap();
    let m2 = Matrix::parse("0 1 3 ; 0 1 3").unwrap();

    let expected = Matrix::parse("0 1 3 ; 0 2 6").unwrap();
    assert_eq!(expected, m1.multiply_each_entry(&m2));
    assert_eq!(expected, m2.multiply_each_entry(&m1));

    let quotient = m2.divide_each_entry(&m1);
    assert_eq!(Matrix::parse("0 1 3 ; 0 0.5 1.5").unwrap(), quotient);
}

#[test]
fn test_map_negative_ln() {
    let m = Matrix::parse("1 2 3 ; 4 5 6").unwrap();

    assert_eq!(Matrix::parse("-1 -2 -3 ; -4 -5 -6").unwrap(), m.negative());
    assert_eq!(m.negative(), m.multiply_scalar(-1.0));
    assert_eq!(Matrix::parse("1 4 9 ; 16 25 36").unwrap(), m.map(|x| x * x));
    assert_eq!(m.ln().get(0, 0), 0.0);
    assert_eq!(Matrix::zeros(1, 1).ln().get(0, 0), f64::NEG_INFINITY);
}

#[test]
fn test_concat_h_round_trip() {
    let a = Matrix::parse("1 2 ; 3 4").unwrap();
    let b = Matrix::parse("5 ; 6").unwrap();

    let joined = a.concat_h(&b);
    assert_eq!(joined, Matrix::parse("1 2 5 ; 3 4 6").unwrap());
    assert_eq!(a, joined.columns_range(0, a.columns() - 1));
    assert_eq!(b, joined.columns_range(2, 2));
}

#[test]
fn test_concat_v_round_trip() {
    let a = Matrix::parse("1 2 ; 3 4").unwrap();
    let b = Matrix::parse("5 6").unwrap();

    let stacked = a.concat_v(&b);
    assert_eq!(stacked, Matrix::parse("1 2 ; 3 4 ; 5 6").unwrap());
    assert_eq!(a, stacked.rows_range(0, a.rows() - 1));
    assert_eq!(b, stacked.rows_range(2, 2));
}

#[test]
fn test_sub_matrix_drops_leading_rows_and_columns() {
    let m = Matrix::parse("1 2 3 ; 4 5 6 ; 7 8 9").unwrap();

    assert_eq!(Matrix::parse("5 6 ; 8 9").unwrap(), m.sub_matrix(1, 1));
    assert_eq!(Matrix::parse("2 3 ; 5 6 ; 8 9").unwrap(), m.sub_matrix(0, 1));
    assert_eq!(m, m.sub_matrix(0, 0));
}

#[test]
fn test_flatten() {
    let m = Matrix::parse("1 2 3 ; 4 5 6").unwrap();

    assert_eq!(Matrix::parse("1 2 3 4 5 6").unwrap(), m.flat_row());
    assert_eq!(Matrix::parse("1;2;3;4;5;6").unwrap(), m.flat_column());
}

#[test]
fn test_sum_reductions() {
    assert_eq!(Matrix::ones(3, 4).sum_all(), 12.0);

    let m = Matrix::parse("1 2 3 ; 4 5 6").unwrap();
    assert_eq!(Matrix::parse("6 ; 15").unwrap(), m.sum_by_row());
    assert_eq!(Matrix::parse("5 7 9").unwrap(), m.sum_by_column());
    assert_eq!(m.sum(), m.sum_by_column());

    let row = Matrix::parse("1 2 3").unwrap();
    assert_eq!(Matrix::parse("6").unwrap(), row.sum());
}

#[test]
fn test_extrema() {
    let m = Matrix::parse("3 7 1 ; 4 0 9").unwrap();

    assert_eq!(m.max(), 9.0);
    assert_eq!(m.min(), 0.0);
    assert_eq!(Matrix::parse("7 ; 9").unwrap(), m.max_by_row());
    assert_eq!(Matrix::parse("1 ; 0").unwrap(), m.min_by_row());
    assert_eq!(Matrix::parse("4 7 9").unwrap(), m.max_by_column());
    assert_eq!(Matrix::parse("3 0 1").unwrap(), m.min_by_column());
}

#[test]
fn test_index_max_ties_resolve_to_last() {
    let m = Matrix::parse("3 7 7 2").unwrap();
    assert_eq!(m.index_max_by_row().get(0, 0), 2.0);

    let column = Matrix::parse("1 ; 5 ; 5 ; 0").unwrap();
    assert_eq!(column.index_max_by_column().get(0, 0), 2.0);
}

#[test]
fn test_index_min_ties_resolve_to_first() {
    let m = Matrix::parse("3 1 1 2").unwrap();
    assert_eq!(m.index_min_by_row().get(0, 0), 1.0);

    let column = Matrix::parse("3 ; 1 ; 1 ; 2").unwrap();
    assert_eq!(column.index_min_by_column().get(0, 0), 1.0);
}

#[test]
fn test_index_reductions_per_row_and_column() {
    let m = Matrix::parse("1 9 2 ; 8 3 4").unwrap();

    assert_eq!(Matrix::parse("1 ; 0").unwrap(), m.index_max_by_row());
    assert_eq!(Matrix::parse("0 ; 1").unwrap(), m.index_min_by_row());
    assert_eq!(Matrix::parse("1 0 1").unwrap(), m.index_max_by_column());
    assert_eq!(Matrix::parse("0 1 0").unwrap(), m.index_min_by_column());
}

#[test]
fn test_normalize() {
    let m = Matrix::parse("0 5 10").unwrap();
    assert_eq!(Matrix::parse("0 0.5 1").unwrap(), m.normalize());
}

#[test]
fn test_normalize_constant_matrix_degenerates() {
    // min == max divides by zero; the NaN is documented, not trapped
    let normalized = Matrix::filled(2, 2, 3.0).normalize();
    assert!(normalized.as_slice().iter().all(|v| v.is_nan()));
}

#[test]
fn test_random_fill_respects_range_and_shape() {
    let mut rng = StdRng::seed_from_u64(99);
    let m = Matrix::random(6, 5, -0.25, 0.25, &mut rng);

    assert_eq!(m.shape(), (6, 5));
    assert!(m.as_slice().iter().all(|&v| (-0.25..0.25).contains(&v)));
    // not all identical
    assert!(m.max() > m.min());
}

#[test]
fn test_one_hot_encoding() {
    let labels = Matrix::parse("0 2 1").unwrap();
    let encoded = Matrix::one_hot(&labels, 3);

    assert_eq!(Matrix::parse("1 0 0 ; 0 0 1 ; 0 1 0").unwrap(), encoded);
    // exactly one 1 per column, at row labels[j]
    assert_eq!(encoded.sum_by_column(), Matrix::ones(1, 3));
}

#[test]
fn test_one_hot_rejects_column_vector() {
    let labels = Matrix::parse("0 ; 2 ; 1").unwrap();
    let result = std::panic::catch_unwind(|| Matrix::one_hot(&labels, 3));
    assert!(result.is_err());
}

#[test]
fn test_row_column_access_and_setters() {
    let mut m = Matrix::parse("1 2 ; 3 4").unwrap();

    assert_eq!(Matrix::parse("3 4").unwrap(), m.row(1));
    assert_eq!(Matrix::parse("2 ; 4").unwrap(), m.column(1));

    m.set(0, 0, 9.0);
    assert_eq!(m.get(0, 0), 9.0);

    m.set_row(1, &Matrix::parse("7 8").unwrap());
    assert_eq!(Matrix::parse("9 2 ; 7 8").unwrap(), m);

    m.set_column_value(0, 0.0);
    assert_eq!(Matrix::parse("0 2 ; 0 8").unwrap(), m);

    m.set_column(1, &Matrix::parse("5 ; 6").unwrap());
    assert_eq!(Matrix::parse("0 5 ; 0 6").unwrap(), m);
}

#[test]
fn test_set_row_and_column_shape_mismatch_panics() {
    let m = Matrix::new(2, 2);
    let wrong = Matrix::new(3, 1);
    assert!(std::panic::catch_unwind(|| {
        let mut m = m.clone();
        m.set_column(0, &wrong)
    })
    .is_err());
    assert!(std::panic::catch_unwind(|| {
        let mut m = m.clone();
        m.set_row(0, &Matrix::new(1, 3))
    })
    .is_err());
}

#[test]
fn test_shape_predicates() {
    assert!(Matrix::new(1, 1).is_scalar());
    assert!(Matrix::new(1, 4).is_row());
    assert!(Matrix::new(4, 1).is_column());
    assert!(Matrix::new(3, 3).is_square());
    assert_eq!(Matrix::new(3, 4).size(), 12);
}

#[test]
fn test_display_shows_shape_and_truncates() {
    let small = Matrix::parse("1 2 ; 3 4").unwrap();
    let printed = small.to_string();
    assert!(printed.starts_with("[2;2]"));
    assert!(printed.contains("1.00000000"));

    let large = Matrix::ones(12, 12).to_string();
    assert!(large.starts_with("[12;12]"));
    assert!(large.contains("..."));
}

#[test]
fn test_add_shape_mismatch_panics() {
    let a = Matrix::new(2, 3);
    let b = Matrix::new(3, 2);
    let result = std::panic::catch_unwind(|| a.add(&b));
    assert!(result.is_err());
}

#[test]
fn test_multiply_shape_mismatch_panics() {
    let a = Matrix::new(2, 3);
    let b = Matrix::new(2, 3);
    let result = std::panic::catch_unwind(|| a.multiply(&b));
    assert!(result.is_err());
}

#[test]
fn test_concat_shape_mismatch_panics() {
    let a = Matrix::new(2, 3);
    let b = Matrix::new(2, 2);
    assert!(std::panic::catch_unwind(|| a.concat_v(&b)).is_err());
    let c = Matrix::new(3, 3);
    assert!(std::panic::catch_unwind(|| a.concat_h(&c)).is_err());
}

#[test]
fn test_index_out_of_range_panics() {
    let m = Matrix::new(2, 2);
    assert!(std::panic::catch_unwind(|| m.get(2, 0)).is_err());
    assert!(std::panic::catch_unwind(|| m.row(5)).is_err());
    assert!(std::panic::catch_unwind(|| m.columns_range(1, 2)).is_err());
}
