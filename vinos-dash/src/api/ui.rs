//! UI serving route
//!
//! Single page: model selector, CSV upload, sample-data buttons, result
//! table and label frequencies. Plain HTML/CSS/JS, no build step.

use axum::response::Html;

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Predicción de Calidad de Vinos</title>
    <style>
        body {
            font-family: system-ui, -apple-system, sans-serif;
            margin: 0;
            display: flex;
            min-height: 100vh;
            line-height: 1.5;
        }
        aside {
            width: 280px;
            padding: 20px;
            background: #f4f0f2;
            border-right: 1px solid #ddd;
        }
        main {
            flex: 1;
            padding: 20px 30px;
            overflow-x: auto;
        }
        h1 {
            color: #5a1a2e;
            border-bottom: 2px solid #8e2043;
            padding-bottom: 10px;
        }
        button, select, input {
            display: block;
            width: 100%;
            margin: 8px 0;
        }
        button {
            padding: 8px;
            background: #8e2043;
            color: white;
            border: none;
            border-radius: 4px;
            cursor: pointer;
        }
        button:hover {
            background: #6d1833;
        }
        table {
            border-collapse: collapse;
            font-size: 0.9em;
            margin-bottom: 24px;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 4px 8px;
            text-align: right;
        }
        th {
            background: #f4f0f2;
        }
        .error {
            color: #b00020;
        }
        .warning {
            color: #a15c00;
        }
    </style>
</head>
<body>
    <aside>
        <h3>Modelo</h3>
        <select id="model"></select>
        <p id="accuracy"></p>
        <h3>Archivo CSV</h3>
        <p><small>Separado por ';' con las columnas requeridas del modelo.</small></p>
        <input type="file" id="file" accept=".csv,text/csv">
        <h3>Datos de ejemplo</h3>
        <button id="samples">Cargar desde la base de datos</button>
        <button id="refresh">Recargar datos</button>
    </aside>
    <main>
        <h1>Predicción de Calidad de Vinos</h1>
        <p>Sube un archivo CSV con las características del vino para predecir su calidad.</p>
        <p id="status"></p>
        <div id="results"></div>
    </main>
    <script>
        const FEATURES = ["fixed_acidity", "volatile_acidity", "citric_acid", "residual_sugar",
            "chlorides", "free_sulfur_dioxide", "total_sulfur_dioxide", "density", "ph",
            "sulphates", "alcohol"];
        const status = document.getElementById("status");
        const results = document.getElementById("results");
        const modelSelect = document.getElementById("model");
        let models = [];

        function setStatus(text, cls) {
            status.textContent = text;
            status.className = cls || "";
        }

        function cell(row, text, tag) {
            const el = document.createElement(tag || "td");
            el.textContent = text === undefined || text === null ? "" : text;
            row.appendChild(el);
        }

        function showAccuracy() {
            const m = models.find(m => m.id === modelSelect.value);
            document.getElementById("accuracy").textContent =
                m && m.accuracy != null ? "Precisión del modelo: " + (m.accuracy * 100).toFixed(1) + "%" : "";
        }

        function render(report) {
            results.replaceChildren();
            const hasId = report.rows.some(r => r.id != null);
            const hasActual = report.rows.some(r => r.actual != null);

            const h2 = document.createElement("h2");
            h2.textContent = "Resultados de la Predicción (" + report.model_name + ")";
            results.appendChild(h2);

            const table = document.createElement("table");
            const head = table.insertRow();
            if (hasId) cell(head, "id", "th");
            FEATURES.forEach(f => cell(head, f, "th"));
            cell(head, "Calidad_Predicha", "th");
            if (hasActual) cell(head, "Calidad_Real", "th");
            report.rows.forEach(r => {
                const tr = table.insertRow();
                if (hasId) cell(tr, r.id);
                FEATURES.forEach(f => cell(tr, r.features[f]));
                cell(tr, r.predicted);
                if (hasActual) cell(tr, r.actual);
            });
            results.appendChild(table);

            const h3 = document.createElement("h2");
            h3.textContent = "Distribución de la Calidad Predicha";
            results.appendChild(h3);
            const dist = document.createElement("table");
            report.distribution.forEach(d => {
                const tr = dist.insertRow();
                cell(tr, d.label, "th");
                cell(tr, d.count);
            });
            results.appendChild(dist);

            if (report.agreement != null) {
                const p = document.createElement("p");
                p.textContent = "Coincidencia con la calidad real: " + (report.agreement * 100).toFixed(1) + "%";
                results.appendChild(p);
            }
        }

        async function call(url, options) {
            const response = await fetch(url, options);
            const body = await response.json();
            if (!response.ok) {
                throw new Error(body.error ? body.error.message : response.statusText);
            }
            return body;
        }

        async function loadModels() {
            models = await call("/api/models");
            models.forEach(m => {
                const opt = document.createElement("option");
                opt.value = m.id;
                opt.textContent = m.name;
                modelSelect.appendChild(opt);
            });
            showAccuracy();
        }

        async function loadSamples() {
            setStatus("Cargando datos de ejemplo...");
            try {
                const body = await call("/api/samples?model=" + encodeURIComponent(modelSelect.value));
                if (body.warning) {
                    results.replaceChildren();
                    setStatus(body.warning, "warning");
                } else {
                    setStatus("");
                    render(body.report);
                }
            } catch (e) {
                setStatus("Error al cargar los datos: " + e.message, "error");
            }
        }

        document.getElementById("file").addEventListener("change", async event => {
            const file = event.target.files[0];
            if (!file) return;
            setStatus("Procesando " + file.name + "...");
            try {
                const text = await file.text();
                const report = await call("/api/predict?model=" + encodeURIComponent(modelSelect.value), {
                    method: "POST",
                    headers: { "content-type": "text/csv" },
                    body: text,
                });
                setStatus("");
                render(report);
            } catch (e) {
                results.replaceChildren();
                setStatus("Error al procesar el archivo: " + e.message, "error");
            }
        });

        document.getElementById("samples").addEventListener("click", loadSamples);
        document.getElementById("refresh").addEventListener("click", async () => {
            await call("/api/samples/refresh", { method: "POST" });
            await loadSamples();
        });
        modelSelect.addEventListener("change", showAccuracy);

        loadModels().catch(e => setStatus("No se pudieron cargar los modelos: " + e.message, "error"));
    </script>
</body>
</html>
"#;
