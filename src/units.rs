pub mod temperature {
    const ZERO_CELSIUS_K: f64 = 273.15;

    pub fn k2c(temp_k: f64) -> f64 {
        temp_k - ZERO_CELSIUS_K
    }

    #[test]
    fn test_temperature() {
        assert_eq!(k2c(273.15), 0.0);
        assert_eq!(format!("{:.1}", k2c(300.0)), "26.9");
        assert_eq!(format!("{:.1}", k2c(283.15)), "10.0");
    }
}
