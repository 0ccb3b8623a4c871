use csv::Writer;
use nalgebra::DVector;
use std::fs::File;
use std::io::{self, Write};

pub fn save_solution_to_csv(
    unknowns: &Vec<String>,
    values: &DVector<f64>,
    filename: &str,
) -> io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["coefficient", "value"])?;
    for (name, value) in unknowns.iter().zip(values.iter()) {
        writer.write_record(&[name.clone(), value.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn save_series_to_txt(function_name: &str, series: &str, filename: &str) -> io::Result<()> {
    let mut file = File::create(filename)?;
    writeln!(file, "{} = {}", function_name, series)?;
    Ok(())
}

///////////////////////////////////////////////////////////////////////////////////////
//                                      TESTS
///////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_solution_csv_has_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("solution.csv");
        let unknowns = vec!["a".to_string(), "b".to_string()];
        let values = DVector::from_vec(vec![2.0, -0.5]);

        save_solution_to_csv(&unknowns, &values, path.to_str().unwrap()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "coefficient,value");
        assert_eq!(lines[1], "a,2");
        assert_eq!(lines[2], "b,-0.5");
    }

    #[test]
    fn test_series_txt_names_the_function() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("series.txt");

        save_series_to_txt("f", "( x^2 + 6*x - 5 )", path.to_str().unwrap()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.trim(), "f = ( x^2 + 6*x - 5 )");
    }
}
