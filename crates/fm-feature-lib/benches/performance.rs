//! Performance benchmarks for fm-feature-lib
//!
//! Run with: cargo bench --package fm-feature-lib

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fm_feature_lib::{
    Config, DataColumn, Feature, FeatureDataModel, FeatureKind, FixedWeirScheme,
    ModelFeatureCoordinateData, io, map_vertices,
};
use geo::{Coord, LineString};
use std::hint::black_box;
use std::io::Cursor;

/// Generate a wiggly polyline with the specified number of vertices
fn generate_line(num_points: usize) -> LineString<f64> {
    (0..num_points)
        .map(|i| {
            let t = i as f64;
            Coord {
                x: t * 10.0,
                y: (t * 0.3).sin() * 5.0,
            }
        })
        .collect()
}

/// Same line with one extra vertex halfway
fn with_inserted_vertex(line: &LineString<f64>) -> LineString<f64> {
    let mut coords = line.0.clone();
    let mid = coords.len() / 2;
    let extra = Coord {
        x: (coords[mid - 1].x + coords[mid].x) / 2.0,
        y: 1000.0,
    };
    coords.insert(mid, extra);
    LineString::new(coords)
}

fn bench_map_vertices(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_vertices");

    for num_points in [100, 1_000, 5_000] {
        let previous = generate_line(num_points);
        let current = with_inserted_vertex(&previous);

        group.throughput(Throughput::Elements(num_points as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_points),
            &(previous, current),
            |b, (previous, current)| {
                b.iter(|| map_vertices(black_box(&previous.0), black_box(&current.0)))
            },
        );
    }

    group.finish();
}

fn bench_geometry_resync(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry_resync");

    for num_points in [100, 1_000] {
        let original = generate_line(num_points);
        let edited = with_inserted_vertex(&original);

        let feature = Feature::new("fxw", original.clone());
        let mut data = ModelFeatureCoordinateData::for_feature(feature.clone());
        for (name, default) in fm_feature_lib::fixed_weir::COLUMNS {
            data.add_data_column(DataColumn::double(name, default));
        }

        group.throughput(Throughput::Elements(num_points as u64));
        group.bench_function(BenchmarkId::from_parameter(num_points), |b| {
            b.iter(|| {
                feature.set_geometry(black_box(edited.clone()));
                feature.set_geometry(black_box(original.clone()));
            })
        });
    }

    group.finish();
}

fn bench_polyline_io(c: &mut Criterion) {
    let mut model = FeatureDataModel::new(Config {
        fixed_weir_scheme: FixedWeirScheme::Villemonte,
    });
    let records: Vec<io::PolylineRecord> = (0..50)
        .map(|i| {
            io::PolylineRecord::new(format!("fxw{i:03}"), generate_line(200))
                .with_columns(vec![vec![1.0; 200]; 7])
        })
        .collect();
    io::import_records(&mut model, FeatureKind::FixedWeir, &records);

    let exported = io::export_records(&model, FeatureKind::FixedWeir);
    let mut buffer = Vec::new();
    io::write(&mut buffer, &exported).expect("write to memory");

    c.bench_function("polyline_write", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(buffer.len());
            io::write(&mut out, black_box(&exported)).expect("write to memory");
            out
        })
    });

    c.bench_function("polyline_read", |b| {
        b.iter(|| io::read(Cursor::new(black_box(&buffer))).expect("read from memory"))
    });
}

criterion_group!(
    benches,
    bench_map_vertices,
    bench_geometry_resync,
    bench_polyline_io
);
criterion_main!(benches);
