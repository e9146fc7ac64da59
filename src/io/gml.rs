use anyhow::{Context, Result, bail};
use geo::{Coord, LineString, Polygon};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read the administrative boundary polygons from a WFS GML file.
///
/// Coordinates are taken from `gml:posList` elements and are expected in the
/// file's native projected CRS (EPSG:25832, easting/northing order). Both
/// plain `gml:Polygon` and `gml:Surface`/`gml:PolygonPatch` members are
/// handled; interior rings become polygon holes.
pub fn read_boundary(path: &Path) -> Result<Vec<Polygon<f64>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open city boundary {:?}", path))?;
    parse_boundary(BufReader::new(file))
        .with_context(|| format!("Failed to parse city boundary {:?}", path))
}

pub fn parse_boundary<R: BufRead>(input: R) -> Result<Vec<Polygon<f64>>> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);

    let mut polygons = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut interiors: Vec<LineString<f64>> = Vec::new();
    let mut in_exterior = false;
    let mut in_interior = false;
    let mut in_pos_list = false;
    let mut srs_dimension = 2;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => match e.local_name().as_ref() {
                b"exterior" | b"outerBoundaryIs" => in_exterior = true,
                b"interior" | b"innerBoundaryIs" => in_interior = true,
                b"posList" => {
                    in_pos_list = true;
                    srs_dimension = get_srs_dimension(&e)?;
                }
                _ => {}
            },
            Event::Text(e) => {
                if in_pos_list {
                    let ring = parse_ring(&e.unescape()?, srs_dimension)?;
                    if in_interior {
                        interiors.push(ring);
                    } else if in_exterior {
                        exterior = Some(ring);
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"posList" => in_pos_list = false,
                b"exterior" | b"outerBoundaryIs" => in_exterior = false,
                b"interior" | b"innerBoundaryIs" => in_interior = false,
                b"Polygon" | b"PolygonPatch" => {
                    if let Some(ring) = exterior.take() {
                        polygons.push(Polygon::new(ring, std::mem::take(&mut interiors)));
                    }
                }
                _ => {}
            },
            _ => {}
        }
        buf.clear();
    }

    if polygons.is_empty() {
        bail!("no boundary polygons found");
    }
    Ok(polygons)
}

fn get_srs_dimension(event: &BytesStart<'_>) -> Result<usize> {
    for attr in event.attributes().with_checks(false) {
        let attr = attr?;
        if attr.key.local_name().as_ref() == b"srsDimension" {
            let value = attr.unescape_value()?;
            return value
                .parse()
                .with_context(|| format!("invalid srsDimension {:?}", value));
        }
    }
    Ok(2)
}

fn parse_ring(text: &str, srs_dimension: usize) -> Result<LineString<f64>> {
    let values: Vec<f64> = text
        .split_whitespace()
        .map(|v| {
            v.parse()
                .with_context(|| format!("invalid coordinate value {:?}", v))
        })
        .collect::<Result<_>>()?;

    if srs_dimension < 2 || values.len() % srs_dimension != 0 {
        bail!(
            "posList length {} does not match srsDimension {}",
            values.len(),
            srs_dimension
        );
    }

    let coords: Vec<Coord<f64>> = values
        .chunks(srs_dimension)
        .map(|c| Coord { x: c[0], y: c[1] })
        .collect();
    if coords.len() < 4 {
        bail!("boundary ring has fewer than 4 coordinates");
    }
    Ok(LineString::new(coords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    const BOUNDARY_GML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wfs:FeatureCollection xmlns:wfs="http://www.opengis.net/wfs" xmlns:gml="http://www.opengis.net/gml/3.2">
  <wfs:member>
    <app:verwaltungsgrenze xmlns:app="http://www.deegree.org/app">
      <app:geom>
        <gml:Surface srsName="EPSG:25832">
          <gml:patches>
            <gml:PolygonPatch>
              <gml:exterior>
                <gml:LinearRing>
                  <gml:posList>560000 5930000 570000 5930000 570000 5940000 560000 5940000 560000 5930000</gml:posList>
                </gml:LinearRing>
              </gml:exterior>
            </gml:PolygonPatch>
          </gml:patches>
        </gml:Surface>
      </app:geom>
    </app:verwaltungsgrenze>
  </wfs:member>
</wfs:FeatureCollection>"#;

    #[test]
    fn parses_surface_patch_boundary() {
        let polygons = parse_boundary(BOUNDARY_GML.as_bytes()).unwrap();
        assert_eq!(polygons.len(), 1);
        assert!((polygons[0].unsigned_area() - 100_000_000.0).abs() < 1.0);
    }

    #[test]
    fn parses_polygon_with_hole() {
        let gml = r#"<gml:Polygon xmlns:gml="http://www.opengis.net/gml/3.2">
          <gml:exterior><gml:LinearRing>
            <gml:posList>0 0 100 0 100 100 0 100 0 0</gml:posList>
          </gml:LinearRing></gml:exterior>
          <gml:interior><gml:LinearRing>
            <gml:posList>40 40 60 40 60 60 40 60 40 40</gml:posList>
          </gml:LinearRing></gml:interior>
        </gml:Polygon>"#;
        let polygons = parse_boundary(gml.as_bytes()).unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].interiors().len(), 1);
        assert!((polygons[0].unsigned_area() - 9_600.0).abs() < 1e-6);
    }

    #[test]
    fn three_dimensional_pos_list() {
        let gml = r#"<gml:Polygon xmlns:gml="http://www.opengis.net/gml/3.2">
          <gml:exterior><gml:LinearRing>
            <gml:posList srsDimension="3">0 0 5 10 0 5 10 10 5 0 10 5 0 0 5</gml:posList>
          </gml:LinearRing></gml:exterior>
        </gml:Polygon>"#;
        let polygons = parse_boundary(gml.as_bytes()).unwrap();
        assert!((polygons[0].unsigned_area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_document_is_an_error() {
        let gml = r#"<gml:FeatureCollection xmlns:gml="http://www.opengis.net/gml/3.2"/>"#;
        assert!(parse_boundary(gml.as_bytes()).is_err());
    }
}
